use super::*;
use crate::database::FunctionDatabase;

fn build_db(files: &[(&str, &str)]) -> (tempfile::TempDir, FunctionDatabase) {
    let dir = tempfile::tempdir().unwrap();
    for (name, contents) in files {
        std::fs::write(dir.path().join(name), contents).unwrap();
    }
    let mut db = FunctionDatabase::new(None);
    db.build(dir.path(), false, false).unwrap();
    (dir, db)
}

#[test]
fn source_directory_is_carried_on_success_and_failure() {
    let (_dir, db) = build_db(&[("a.c", "void A(void) {}\n")]);

    let mut builder = CallTreeBuilder::new(&db);
    let ok = builder.build("A", 5, true, false, "t".to_string(), Some("src".to_string()));
    assert_eq!(ok.source_directory.as_deref(), Some("src"));

    let mut builder = CallTreeBuilder::new(&db);
    let failed = builder.build("Missing", 5, true, false, "t".to_string(), Some("src".to_string()));
    assert_eq!(failed.source_directory.as_deref(), Some("src"));
}

#[test]
fn start_not_found_produces_failed_result() {
    let (_dir, db) = build_db(&[("a.c", "void A(void) {}\n")]);
    let mut builder = CallTreeBuilder::new(&db);
    let result = builder.build("Missing", 5, true, false, "t".to_string(), None);
    assert!(result.root.is_none());
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.statistics, AnalysisStatistics::default());
}

#[test]
fn b1_zero_depth_truncates_root_with_no_children() {
    let (_dir, db) = build_db(&[("a.c", "void A(void) {\n    B();\n}\n"), ("b.c", "void B(void) {}\n")]);
    let mut builder = CallTreeBuilder::new(&db);
    let result = builder.build("A", 0, true, false, "t".to_string(), None);
    let root = result.root.unwrap();
    assert!(root.is_truncated);
    assert!(root.children.is_empty());
}

#[test]
fn b2_depth_one_yields_direct_callees_each_truncated() {
    let (_dir, db) = build_db(&[
        ("a.c", "void A(void) {\n    B();\n}\n"),
        ("b.c", "void B(void) {\n    C();\n}\n"),
        ("c.c", "void C(void) {}\n"),
    ]);
    let mut builder = CallTreeBuilder::new(&db);
    let result = builder.build("A", 1, true, false, "t".to_string(), None);
    let root = result.root.unwrap();
    assert!(!root.is_truncated);
    assert_eq!(root.children.len(), 1);
    assert!(root.children[0].is_truncated);
    assert!(root.children[0].children.is_empty());
}

#[test]
fn b3_self_recursion_produces_one_recursive_child_and_one_cycle() {
    let (_dir, db) = build_db(&[("a.c", "void A(void) {\n    A();\n}\n")]);
    let mut builder = CallTreeBuilder::new(&db);
    let result = builder.build("A", 5, true, false, "t".to_string(), None);
    let root = result.root.unwrap();
    assert_eq!(root.children.len(), 1);
    assert!(root.children[0].is_recursive);
    assert!(root.children[0].children.is_empty());
    assert_eq!(result.circular_dependencies.len(), 1);
    assert_eq!(result.circular_dependencies[0].cycle.len(), 2);
}

#[test]
fn scenario_4_mutual_recursion_cycle() {
    let (_dir, db) = build_db(&[
        ("a.c", "void A(void) {\n    B();\n}\n"),
        ("b.c", "void B(void) {\n    A();\n}\n"),
    ]);
    let mut builder = CallTreeBuilder::new(&db);
    let result = builder.build("A", 5, true, false, "t".to_string(), None);
    let root = result.root.unwrap();
    assert_eq!(root.children.len(), 1);
    let b = &root.children[0];
    assert!(!b.is_recursive);
    assert_eq!(b.children.len(), 1);
    assert!(b.children[0].is_recursive);
    assert_eq!(result.circular_dependencies.len(), 1);
    assert_eq!(result.circular_dependencies[0].cycle.len(), 3);
}

#[test]
fn p4_conditional_and_loop_flags_propagate_to_child_node() {
    let (_dir, db) = build_db(&[
        (
            "a.c",
            "void A(void) {\n    for (i = 0; i < 3; i++) {\n        B();\n    }\n}\n",
        ),
        ("b.c", "void B(void) {}\n"),
    ]);
    let mut builder = CallTreeBuilder::new(&db);
    let result = builder.build("A", 5, true, false, "t".to_string(), None);
    let root = result.root.unwrap();
    let b = &root.children[0];
    assert!(b.is_loop);
    assert_eq!(b.loop_condition_text.as_deref(), Some("i = 0; i < 3; i++"));
    assert!(!b.is_optional);
}

#[test]
fn rte_functions_excluded_when_include_rte_is_false() {
    let (_dir, db) = build_db(&[
        ("a.c", "void A(void) {\n    Rte_Write_Foo();\n    B();\n}\n"),
        ("b.c", "void B(void) {}\n"),
        ("rte.c", "void Rte_Write_Foo(void) {}\n"),
    ]);
    let mut builder = CallTreeBuilder::new(&db);
    let result = builder.build("A", 5, false, false, "t".to_string(), None);
    let root = result.root.unwrap();
    assert_eq!(root.children.len(), 1);
    assert_eq!(root.children[0].function.name, "B");
}
