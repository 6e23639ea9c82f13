use objdump_analyzer_core::analysis::RegisterFilter;

#[test]
fn whole_word_register_matches() {
    let filter = RegisterFilter::new(["a0"]).unwrap();
    assert!(filter.check("1000: lw a0, 0(a1)").is_some());
}

#[test]
fn partial_identifier_does_not_match() {
    let filter = RegisterFilter::new(["a"]).unwrap();
    assert!(filter.check("1000: lw a0, 0(a1)").is_none());
}

#[test]
fn no_registers_never_match() {
    let filter = RegisterFilter::new(Vec::<String>::new()).unwrap();
    let hits = filter.filter(["1000: lw a0, 0(a1)", "1004: ret", ""]);
    assert!(hits.is_empty());
}

#[test]
fn reported_unit_is_the_full_line() {
    let filter = RegisterFilter::new(["sp", "ra"]).unwrap();
    let line = "80000010:\tff010113          \taddi\tsp,sp,-16";
    let hit = filter.check(line).unwrap();
    assert_eq!(hit.line, line);
    assert_eq!(hit.register, "sp");
}

#[test]
fn registers_inside_symbol_names_are_not_matches() {
    let filter = RegisterFilter::new(["ra"]).unwrap();
    assert!(filter.check("80000020:\t0000006f\tj\t80000020 <trap_handler>").is_none());
    assert!(filter.check("80000024:\t00008067\tret\t# uses ra").is_some());
}
