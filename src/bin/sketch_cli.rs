#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("sketch_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use sphere_sketch::geom::{Point3, SphericalCoord, ViewTransform, render_arc};
    use sphere_sketch::parse;
    use sphere_sketch::render::{self, SvgOptions};
    use sphere_sketch::scene::{ArcSpec, BinSpec, Color, SceneConfig, StrokeStyle, build_scene};
    use std::fmt::Write as _;
    use std::fs;
    use std::path::{Path, PathBuf};

    const POINT_DECIMALS: usize = 6;

    const USAGE: &str = r"sketch_cli (sphere-sketch)

USAGE:
  sketch_cli list
  sketch_cli render <scenario|all> [options]
  sketch_cli render --config <scene.xml> [options]
  sketch_cli arc <theta1> <phi1> <theta2> <phi2> [--radius r] [--elevation e] [--azimuth a]

SCENARIOS:
  qlsc_level1
  qlsc_level2
  qlsc_level3
  qlsc_top
  arcs_only
  split_runs

OPTIONS (render):
  --config <path>    Read the scene from an XML file instead of a scenario
  --out <path>       Write the SVG here (single scene only; default stdout)
  --out-dir <dir>    Write <scenario>.svg to this dir (required for `all`)
  --overwrite        Overwrite existing output files
  -h, --help         Show this help

OPTIONS (arc):
  --radius <r>       Sphere radius (default 3)
  --elevation <e>    Camera elevation in degrees (default 70)
  --azimuth <a>      Camera azimuth in degrees (default 115)
";

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let Some(command) = args.next() else {
            print_usage();
            return Ok(());
        };

        match command.as_str() {
            "list" => {
                print_scenarios();
                Ok(())
            }
            "render" => cmd_render(&mut args),
            "arc" => cmd_arc(&mut args),
            "-h" | "--help" | "help" => {
                print_usage();
                Ok(())
            }
            other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
        }
    }

    fn print_usage() {
        println!("{USAGE}");
    }

    fn print_scenarios() {
        for scenario in Scenario::ALL {
            println!("{:<14} {}", scenario.name(), scenario.description());
        }
    }

    fn cmd_render(args: &mut Args) -> Result<(), String> {
        let mut target: Option<String> = None;
        let mut config_path: Option<PathBuf> = None;
        let mut out_path: Option<PathBuf> = None;
        let mut out_dir: Option<PathBuf> = None;
        let mut overwrite = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => config_path = Some(PathBuf::from(args.value("--config")?)),
                "--out" => out_path = Some(PathBuf::from(args.value("--out")?)),
                "--out-dir" => out_dir = Some(PathBuf::from(args.value("--out-dir")?)),
                "--overwrite" => overwrite = true,
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other if other.starts_with("--") => {
                    return Err(format!("unknown option `{other}`\n\n{USAGE}"));
                }
                other => {
                    if target.is_some() {
                        return Err(format!("unexpected argument `{other}`"));
                    }
                    target = Some(other.to_owned());
                }
            }
        }

        if out_path.is_some() && out_dir.is_some() {
            return Err("use either --out or --out-dir (not both)".to_string());
        }

        let jobs: Vec<(String, SceneConfig)> = match (target.as_deref(), config_path.as_deref()) {
            (Some(_), Some(_)) => {
                return Err("give either a scenario or --config (not both)".to_string());
            }
            (None, None) => return Err(format!("missing scenario name\n\n{USAGE}")),
            (None, Some(path)) => {
                let xml = fs::read_to_string(path)
                    .map_err(|e| format!("read {}: {e}", path.display()))?;
                let config = parse::parse_str(&xml).map_err(|e| format!("{}: {e}", path.display()))?;
                let name = path
                    .file_stem()
                    .map_or_else(|| "scene".to_owned(), |stem| stem.to_string_lossy().into_owned());
                vec![(name, config)]
            }
            (Some("all"), None) => {
                if out_dir.is_none() {
                    return Err("`render all` requires --out-dir".to_string());
                }
                Scenario::ALL
                    .iter()
                    .map(|scenario| (scenario.name().to_owned(), scenario.config()))
                    .collect()
            }
            (Some(name), None) => {
                let scenario = Scenario::from_str(name).ok_or_else(|| unknown_scenario(name))?;
                vec![(scenario.name().to_owned(), scenario.config())]
            }
        };

        if let Some(dir) = out_dir.as_deref() {
            fs::create_dir_all(dir).map_err(|e| format!("create out dir: {e}"))?;
        }

        for (name, config) in jobs {
            let svg = render_config(&name, &config)?;
            if let Some(dir) = out_dir.as_deref() {
                let path = dir.join(format!("{name}.svg"));
                write_text_file(&path, &svg, overwrite)?;
                eprintln!("wrote {}", path.display());
            } else if let Some(path) = out_path.as_deref() {
                write_text_file(path, &svg, overwrite)?;
                eprintln!("wrote {}", path.display());
            } else {
                print!("{svg}");
            }
        }
        Ok(())
    }

    fn render_config(name: &str, config: &SceneConfig) -> Result<String, String> {
        let mut scene = build_scene(config).map_err(|e| format!("{name}: {e}"))?;
        let svg = render::render_svg(&mut scene, &SvgOptions::default())
            .map_err(|e| format!("{name}: {e}"))?;
        eprintln!("{name}: {}", scene.diagnostics);
        Ok(svg)
    }

    fn cmd_arc(args: &mut Args) -> Result<(), String> {
        let mut angles = [0.0_f64; 4];
        for (slot, label) in angles.iter_mut().zip(["theta1", "phi1", "theta2", "phi2"]) {
            let raw = args.next().ok_or_else(|| format!("missing {label}\n\n{USAGE}"))?;
            *slot = parse_number(label, &raw)?;
        }

        let defaults = SceneConfig::default();
        let mut radius = defaults.radius;
        let mut elevation = defaults.elevation;
        let mut azimuth = defaults.azimuth;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--radius" => radius = parse_number("--radius", &args.value("--radius")?)?,
                "--elevation" => {
                    elevation = parse_number("--elevation", &args.value("--elevation")?)?;
                }
                "--azimuth" => azimuth = parse_number("--azimuth", &args.value("--azimuth")?)?,
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        let view = ViewTransform::from_main_coords(elevation, azimuth).map_err(|e| e.to_string())?;
        let [theta1, phi1, theta2, phi2] = angles;
        let split = render_arc(
            SphericalCoord::new(theta1, phi1),
            SphericalCoord::new(theta2, phi2),
            radius,
            &view,
        );

        let mut out = String::new();
        write_points(&mut out, "visible", split.visible());
        write_points(&mut out, "hidden", split.hidden());
        print!("{out}");

        let diag = split.diagnostics();
        if split.is_empty() {
            eprintln!("arc is undefined (coincident or antipodal endpoints, or bad radius)");
        } else {
            eprintln!(
                "samples={} visible={} hidden={} runs={}",
                diag.sample_count, diag.visible_count, diag.hidden_count, diag.run_count
            );
        }
        Ok(())
    }

    fn write_points(out: &mut String, label: &str, points: &[Point3]) {
        let _ = writeln!(out, "{label} {}", points.len());
        for p in points {
            let _ = writeln!(
                out,
                "{:.prec$} {:.prec$} {:.prec$}",
                p.x,
                p.y,
                p.z,
                prec = POINT_DECIMALS
            );
        }
    }

    fn parse_number(label: &str, raw: &str) -> Result<f64, String> {
        raw.parse::<f64>()
            .map_err(|e| format!("invalid value for {label}: `{raw}` ({e})"))
    }

    fn unknown_scenario(name: &str) -> String {
        let mut msg = format!("unknown scenario `{name}`\n\navailable scenarios:\n");
        for scenario in Scenario::ALL {
            let _ = writeln!(msg, "  {}", scenario.name());
        }
        msg
    }

    fn write_text_file(path: &Path, text: &str, overwrite: bool) -> Result<(), String> {
        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }
        fs::write(path, text).map_err(|e| format!("write {}: {e}", path.display()))
    }

    #[derive(Debug, Clone, Copy)]
    enum Scenario {
        QlscLevel1,
        QlscLevel2,
        QlscLevel3,
        QlscTop,
        QlscBins,
        ArcsOnly,
        SplitRuns,
    }

    impl Scenario {
        const ALL: &'static [Scenario] = &[
            Scenario::QlscLevel1,
            Scenario::QlscLevel2,
            Scenario::QlscLevel3,
            Scenario::QlscTop,
            Scenario::QlscBins,
            Scenario::ArcsOnly,
            Scenario::SplitRuns,
        ];

        fn name(self) -> &'static str {
            match self {
                Scenario::QlscLevel1 => "qlsc_level1",
                Scenario::QlscLevel2 => "qlsc_level2",
                Scenario::QlscLevel3 => "qlsc_level3",
                Scenario::QlscTop => "qlsc_top",
                Scenario::QlscBins => "qlsc_bins",
                Scenario::ArcsOnly => "arcs_only",
                Scenario::SplitRuns => "split_runs",
            }
        }

        fn description(self) -> &'static str {
            match self {
                Scenario::QlscLevel1 => "default diagram, 2 lines per face side",
                Scenario::QlscLevel2 => "4 lines per face side",
                Scenario::QlscLevel3 => "8 lines per face side, no cube overlay",
                Scenario::QlscTop => "level 2 seen from straight above",
                Scenario::QlscBins => "level 2 with bins outlined on three faces",
                Scenario::ArcsOnly => "sphere, axes and a few user arcs",
                Scenario::SplitRuns => "level 2 with one path per visibility run",
            }
        }

        fn from_str(name: &str) -> Option<Self> {
            Self::ALL.iter().copied().find(|scenario| scenario.name() == name)
        }

        fn config(self) -> SceneConfig {
            let base = SceneConfig::default();
            match self {
                Scenario::QlscLevel1 => base,
                Scenario::QlscLevel2 => SceneConfig {
                    bin_level: 2,
                    ..base
                },
                Scenario::QlscLevel3 => SceneConfig {
                    bin_level: 3,
                    show_cube: false,
                    ..base
                },
                Scenario::QlscTop => SceneConfig {
                    bin_level: 2,
                    elevation: 0.0,
                    azimuth: 0.0,
                    ..base
                },
                Scenario::QlscBins => SceneConfig {
                    bin_level: 2,
                    bins: vec![
                        BinSpec::new(0, 1, 2),
                        BinSpec::new(1, 2, 1)
                            .with_style(StrokeStyle::solid(Color::GREEN, 1.6)),
                        BinSpec::new(5, 0, 3),
                    ],
                    ..base
                },
                Scenario::ArcsOnly => SceneConfig {
                    show_grid: false,
                    show_cube: false,
                    arcs: vec![
                        ArcSpec::new(0.0, 0.0, 0.0, 90.0),
                        ArcSpec::new(0.0, 20.5, 0.0, 150.5)
                            .with_style(StrokeStyle::solid(Color::ORANGE, 1.6)),
                        ArcSpec::new(60.0, -30.0, -45.0, 200.0)
                            .with_style(StrokeStyle::solid(Color::GREEN, 1.2)),
                    ],
                    ..base
                },
                Scenario::SplitRuns => SceneConfig {
                    bin_level: 2,
                    split_runs: true,
                    ..base
                },
            }
        }
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next().ok_or_else(|| format!("missing value for {flag}"))
        }
    }
}
