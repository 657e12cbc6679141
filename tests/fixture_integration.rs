//! Integration tests against the fixture corpus in `testdata/`.

use std::path::PathBuf;

use langscan::{analyze, builtin_registry, FileReport, SourceFile};

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

/// Analyze a fixture, picking the language from its extension.
fn analyze_fixture(rel: &str) -> FileReport {
    let path = testdata_path().join(rel);
    let content = std::fs::read(&path).expect("should read fixture");
    let ext = path.extension().and_then(|e| e.to_str()).expect("fixture has an extension");
    let language = builtin_registry()
        .language_for_extension(ext)
        .expect("extension should be registered");
    analyze(&SourceFile::new(rel, language, content)).expect("fixture should analyze")
}

fn qualified_names(report: &FileReport) -> Vec<String> {
    report.functions.iter().map(|f| f.qualified_name()).collect()
}

#[test]
fn test_go_merged_imports() {
    let report = analyze_fixture("go/dependencies0.go");
    assert_eq!(report.language, "go");
    assert_eq!(
        report.modules().collect::<Vec<_>>(),
        vec!["math", "container/list", "fmt", "reflect", "sync", "testing"]
    );
    assert!(!report.truncated);
    assert!(!report.has_diagnostics());
}

#[test]
fn test_go_receiver_method_with_reflection_body() {
    let report = analyze_fixture("go/dependencies0.go");
    assert_eq!(report.functions.len(), 1, "Expected only MakeRpc, no function literals");

    let make_rpc = &report.functions[0];
    assert_eq!(make_rpc.qualified_name(), "Client.MakeRpc");
    let params: Vec<_> = make_rpc.params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(params, vec!["rpcName", "fptr"]);
    assert_eq!(make_rpc.results, vec!["error"]);
    assert!(make_rpc.returns_error_like);

    let client = report.find_type("Client").expect("Expected the Client struct");
    assert_eq!(client.kind, "struct");
    assert!(client.owner.is_none());
    assert!(report.comments.iter().any(|c| c.text == "// Client struct"));
}

#[test]
fn test_go_free_functions() {
    let report = analyze_fixture("go/functions0.go");
    assert_eq!(
        report.modules().collect::<Vec<_>>(),
        vec!["container/list", "fmt", "reflect", "sync"]
    );
    assert_eq!(qualified_names(&report), vec!["MakeRpc", "pcheck", "min", "max"]);

    let pcheck = report.find_function("pcheck").expect("Expected pcheck");
    assert!(pcheck.results.is_empty());
    assert!(!pcheck.returns_error_like);

    let min = report.find_function("min").expect("Expected min");
    assert_eq!(min.param_count(), 2);
    assert!(min.params.iter().all(|p| p.type_name == "int"));
    assert_eq!(min.results, vec!["int"]);
    assert!(!min.returns_error_like);
}

#[test]
fn test_c_includes_and_definitions() {
    let report = analyze_fixture("c/line_comments1.c");
    assert_eq!(
        report.modules().collect::<Vec<_>>(),
        vec!["radix_tree.h", "stdlib.h", "stdio.h"]
    );

    let names: Vec<&str> = report.functions.iter().map(|f| f.name.as_str()).collect();
    for expected in [
        "div_round_up",
        "new_radix_data_node",
        "new_radix_tree",
        "radix_tree_insert",
        "radix_tree_find",
        "radix_tree_delete",
        "radix_tree_dump",
    ] {
        assert!(names.contains(&expected), "Expected {} in {:?}", expected, names);
    }
    for call in ["sizeof", "for", "if", "while", "free", "malloc"] {
        assert!(!names.contains(&call), "Unexpected {} in {:?}", call, names);
    }

    let node = report.find_type("radix_node").expect("Expected struct radix_node");
    assert_eq!(node.kind, "struct");
    assert_eq!(node.span.line, 14);

    let find = report.find_function("radix_tree_find").expect("Expected radix_tree_find");
    assert_eq!(find.results, vec!["struct radix_data_node *"]);
    let params: Vec<_> = find.params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(params, vec!["tree", "key"]);
}

#[test]
fn test_csharp_constructors_and_usings() {
    let report = analyze_fixture("csharp/line_comments0.cs");
    assert_eq!(report.language, "csharp");
    assert_eq!(
        report.modules().collect::<Vec<_>>(),
        vec!["System", "System.Runtime.Serialization"]
    );
    assert_eq!(report.methods_of("VssBadStateException").count(), 4);
    assert!(report.functions.iter().all(|f| f.results.is_empty()));
}

#[test]
fn test_java_imports_and_methods() {
    let report = analyze_fixture("java/strings0.java");
    assert_eq!(
        report.modules().collect::<Vec<_>>(),
        vec![
            "hudson.Extension",
            "jenkins.util.SystemProperties",
            "hudson.Util",
            "hudson.model.Descriptor.FormException",
            "hudson.model.User",
            "hudson.model.UserProperty",
            "hudson.model.UserPropertyDescriptor",
            "hudson.security.ACL",
            "hudson.util.HttpResponses",
            "hudson.util.Secret",
        ]
    );
    assert_eq!(
        qualified_names(&report),
        vec![
            "ApiTokenProperty.ApiTokenProperty",
            "ApiTokenProperty.matchesPassword",
            "ApiTokenProperty.hasPermissionToSeeToken",
            "ApiTokenProperty.changeApiToken",
            "ApiTokenProperty._changeApiToken",
            "ApiTokenProperty.reconfigure",
        ]
    );
    let reconfigure = report.find_function("reconfigure").expect("Expected reconfigure");
    let params: Vec<_> = reconfigure.params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(params, vec!["req", "form"]);
}

#[test]
fn test_java_nested_types() {
    let report = analyze_fixture("java/errors.java");
    assert_eq!(report.imports.len(), 8);
    assert!(report.modules().all(|m| m.starts_with("java.")));

    let names = qualified_names(&report);
    for expected in [
        "Simulator.main",
        "Simulator.emptyLayer",
        "Simulator.createBall",
        "Ball.Ball",
        "Ball.toString",
        "Operator.operate",
    ] {
        assert!(names.iter().any(|n| n == expected), "Expected {} in {:?}", expected, names);
    }

    let simulator = report.find_type("Simulator").expect("Expected Simulator");
    assert!(simulator.owner.is_none());
    let ball = report.find_type("Ball").expect("Expected Ball");
    assert_eq!(ball.owner.as_deref(), Some("Simulator"));
    let operator = report.find_type("Operator").expect("Expected Operator");
    assert_eq!(operator.kind, "interface");
}

#[test]
fn test_javascript_module_imports() {
    let report = analyze_fixture("javascript/dependencies0.js");
    assert_eq!(
        report.modules().collect::<Vec<_>>(),
        vec!["meow", "chalk", "lodash/fp/map", "./lissie"]
    );
    assert!(report.functions.is_empty());
}

#[test]
fn test_javascript_callbacks_are_not_declarations() {
    let report = analyze_fixture("javascript/functions1.js");
    assert_eq!(report.imports.len(), 0);
    assert_eq!(qualified_names(&report), vec!["codebotBootstrap"]);
    let params: Vec<_> = report.functions[0].params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(params, vec!["theAppConfig"]);
}

#[test]
fn test_python_imports_and_classes() {
    let report = analyze_fixture("python/dependencies1.py");
    assert_eq!(
        report.modules().collect::<Vec<_>>(),
        vec![
            "pandas",
            "numpy",
            "bokeh.io",
            "bokeh.plotting",
            "project",
            "collections",
            "multiprocessing",
            "datetime",
            "math",
        ]
    );
    assert_eq!(
        qualified_names(&report),
        vec![
            "sim_helper.__init__",
            "sim_helper.sweep",
            "sim_helper.clear",
            "sim_process",
            "wanglandauising.__init__",
            "wanglandauising.run",
            "wanglandauising.check_flatness",
            "wanglandauising.u",
        ]
    );
    let classes: Vec<_> = report.types.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(classes, vec!["sim_helper", "wanglandauising"]);
}

#[test]
fn test_ruby_mixin_inside_block() {
    let report = analyze_fixture("ruby/dependencies1.rb");
    assert_eq!(report.language, "ruby");
    assert_eq!(
        report.modules().collect::<Vec<_>>(),
        vec!["Sortable::InstanceMethods"]
    );
    assert!(report.find_function("included").is_some());
}

#[test]
fn test_every_fixture_is_deterministic() {
    for lang in ["c", "csharp", "go", "java", "javascript", "python", "ruby"] {
        let dir = testdata_path().join(lang);
        for entry in std::fs::read_dir(&dir).expect("should read fixture dir") {
            let path = entry.expect("dir entry").path();
            let rel = path
                .strip_prefix(testdata_path())
                .expect("fixture under testdata")
                .to_string_lossy()
                .replace('\\', "/");
            let first = analyze_fixture(&rel);
            let second = analyze_fixture(&rel);
            assert_eq!(first, second, "Expected identical reports for {}", rel);
            assert!(!first.truncated, "Expected {} to be scanned to the end", rel);
        }
    }
}
