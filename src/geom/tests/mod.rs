mod test_arc_basic;
