use sphere_sketch::SketchEngine;
use sphere_sketch::geom::{Facing, SphericalCoord, Tolerance, Vec3, ViewTransform, render_arc};
use sphere_sketch::parse;
use sphere_sketch::render::{SvgOptions, render_svg, write_svg};
use sphere_sketch::scene::{DrawCommand, Layer, SceneConfig, build_scene};

const SCENE_XML: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/qlsc_scene.xml"
));

fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

#[test]
fn engine_initializes() {
    let engine = SketchEngine::new();
    assert!(engine.is_initialized());
    assert_eq!(engine.config(), &SceneConfig::default());
}

#[test]
fn engine_renders_loaded_scene() {
    let mut engine = SketchEngine::new();
    engine.load_scene_xml(SCENE_XML).expect("load scene");
    assert_eq!(engine.config().bin_level, 2);

    let svg = engine.render_svg().expect("render svg");
    assert!(svg.contains("<svg"));
    assert_eq!(count(&svg, "<circle"), 1);

    let summary = engine.get_diagnostics().expect("diagnostics");
    assert!(summary.starts_with("arcs: 49 drawn, 1 skipped"), "{summary}");
    assert!(summary.contains("warning: arc #1 skipped"), "{summary}");
}

#[test]
fn engine_rejects_bad_input() {
    let mut engine = SketchEngine::new();
    assert!(engine.load_scene_xml("<svg/>").is_err());
    assert!(engine.set_camera(f64::NAN, 0.0).is_err());
    assert_eq!(engine.config(), &SceneConfig::default());

    engine.set_camera(45.0, 10.0).expect("finite camera");
    assert!((engine.config().elevation - 45.0).abs() < f64::EPSILON);
}

#[test]
fn xml_scene_to_svg_end_to_end() {
    let config = parse::parse_str(SCENE_XML).expect("parse scene");
    let mut scene = build_scene(&config).expect("build scene");
    let svg = render_svg(&mut scene, &SvgOptions::default()).expect("write svg");
    let diagnostics = &scene.diagnostics;

    // 12 edges + 6 faces × 2 directions × 3 interior lines + 2 user arcs
    assert_eq!(diagnostics.arcs_drawn + diagnostics.arcs_skipped, 50);
    assert_eq!(diagnostics.arcs_skipped, 1);
    assert_eq!(count(&svg, "<path"), diagnostics.polylines_emitted);
    // 12 cube edges + 3 axes
    assert_eq!(count(&svg, "<line"), 15);
    assert_eq!(count(&svg, "<text"), 3);
    assert!(count(&svg, r#"class="arcs""#) >= 2);
    assert!(svg.contains("stroke-dasharray"));
    assert!(svg.contains(r##"stroke="#e67800""##));
}

#[test]
fn paint_order_puts_sphere_first_and_axes_last() {
    let scene = build_scene(&SceneConfig::default()).expect("build scene");
    let commands = scene.drawing.commands();
    assert!(matches!(commands.first(), Some(DrawCommand::Disc { .. })));
    assert!(matches!(commands.last(), Some(DrawCommand::Label { .. })));

    let layer_of = |command: &DrawCommand| match command {
        DrawCommand::Polyline { layer, .. } | DrawCommand::Segment { layer, .. } => Some(*layer),
        _ => None,
    };
    let layers: Vec<Layer> = commands.iter().filter_map(layer_of).collect();
    let last_grid = layers.iter().rposition(|l| *l == Layer::Grid).expect("grid drawn");
    let first_edge = layers.iter().position(|l| *l == Layer::Edges).expect("edges drawn");
    let first_cube = layers.iter().position(|l| *l == Layer::Cube).expect("cube drawn");
    assert!(last_grid < first_edge);
    assert!(first_edge < first_cube);
}

#[test]
fn building_is_deterministic() {
    let config = SceneConfig {
        bin_level: 3,
        ..SceneConfig::default()
    };
    let first = build_scene(&config).expect("first build");
    let second = build_scene(&config).expect("second build");
    assert_eq!(first.drawing, second.drawing);

    let view = first.view;
    let a = write_svg(&first.drawing, &view, &SvgOptions::default()).expect("svg");
    let b = write_svg(&second.drawing, &view, &SvgOptions::default()).expect("svg");
    assert_eq!(a, b);
}

#[test]
fn every_grid_sample_lies_on_the_sphere() {
    let config = SceneConfig::default();
    let scene = build_scene(&config).expect("build scene");
    let tol = Tolerance::LOOSE;
    for command in scene.drawing.commands() {
        if let DrawCommand::Polyline { points, .. } = command {
            for p in points {
                assert!(tol.approx_eq_f64(p.norm(), config.radius), "{p:?}");
            }
        }
    }
}

#[test]
fn arc_through_the_silhouette_from_default_camera() {
    let view = ViewTransform::from_main_coords(70.0, 115.0).expect("camera");
    let depth = view.view_direction();
    // Endpoints straddle the silhouette: one toward the viewer, one away.
    let front = SphericalCoord::from_cartesian(depth.mul_scalar(3.0).into()).expect("front");
    let side = depth.cross(Vec3::Z).normalized().expect("side axis");
    let back_dir = side.sub(depth.mul_scalar(0.5));
    let back = SphericalCoord::from_cartesian(back_dir.mul_scalar(3.0).into()).expect("back");

    let split = render_arc(front, back, 3.0, &view);
    assert!(!split.visible().is_empty());
    assert!(!split.hidden().is_empty());
    let runs = split.runs();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].facing, Facing::Front);
    assert_eq!(runs[1].facing, Facing::Back);
}

#[test]
fn edges_toggle_reaches_the_drawing() {
    let config = parse::parse_str(r#"<scene><edges show="false"/></scene>"#).expect("parse");
    let mut scene = build_scene(&config).expect("build scene");
    // Level 1 keeps only the 12 interior lines.
    assert_eq!(scene.diagnostics.arcs_drawn, 12);
    let svg = render_svg(&mut scene, &SvgOptions::default()).expect("svg");
    assert_eq!(count(&svg, r#"class="edges""#), 0);
    assert!(count(&svg, r#"class="grid""#) >= 12);
}

#[test]
fn interleaved_scene_with_bin_outline() {
    let xml = r#"<!-- outlined bin between two arcs -->
<scene bin-level="2" elevation="60" azimuth="30">
  <arc theta1="0" phi1="0" theta2="45" phi2="90"/>
  <grid width="0.4"/>
  <bin face="1" ix="2" iy="1" color="green"/>
  <arc theta1="10" phi1="20" theta2="-10" phi2="150"/>
</scene>"#;
    let mut engine = SketchEngine::new();
    engine.load_scene_xml(xml).expect("load scene");
    assert_eq!(engine.config().arcs.len(), 2);
    assert_eq!(engine.config().bins.len(), 1);

    let svg = engine.render_svg().expect("render svg");
    assert!(count(&svg, r#"class="bins""#) >= 4);
    let summary = engine.get_diagnostics().expect("diagnostics");
    // 12 edges + 36 interior lines + 4 bin sides + 2 arcs
    assert!(summary.starts_with("arcs: 54 drawn, 0 skipped"), "{summary}");
    assert!(summary.contains("bins: 96 (4 per face side)"), "{summary}");
}
