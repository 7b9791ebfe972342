//! End-to-end tests: build a DAG, render it, and write it to disk.

use std::fs;

use jobscribe::dagman::{SCRIPT_PRE, VARS};
use jobscribe::{
    DagError, DagJob, DagNode, DagScript, HtCondorSubmit, Macros, NodeKeyword, SbatchSubmit,
    SubmitRef,
};

const EXPECTED_DAG: &str = "JOB A test.submit
VARS A name=\"value\"
SCRIPT PRE A test.py $JOB
JOB B test.submit
PARENT A CHILD B";

const EXPECTED_SUBMIT: &str = "universe = vanilla
executable = test.py
args = \"$(name)\"
queue 1";

fn make_job() -> HtCondorSubmit {
    let mut job = HtCondorSubmit::new("test.submit", "test.py");
    job.commands
        .insert("args".to_string(), "\"$(name)\"".to_string());
    job
}

fn make_dag() -> DagJob {
    let job = make_job();
    let mut nodes = vec![DagNode::new("A", job.clone()), DagNode::new("B", job)];

    nodes[0]
        .keywords
        .insert(VARS.to_string(), Macros::new().with("name", "value").into());
    nodes[0]
        .keywords
        .insert(SCRIPT_PRE.to_string(), DagScript::new("test.py").into());

    let mut dag = DagJob::new("test.dag", nodes);
    dag.nodes[0]
        .keywords
        .get_mut(SCRIPT_PRE)
        .and_then(NodeKeyword::as_script_mut)
        .expect("SCRIPT PRE is a script")
        .push_arg("$JOB");
    dag.add_dependency(["A"], ["B"]).unwrap();
    dag
}

#[test]
fn test_submit_description_render() {
    assert_eq!(make_job().to_string(), EXPECTED_SUBMIT);
}

#[test]
fn test_keyword_renders() {
    let dag = make_dag();
    let keywords = &dag.nodes[0].keywords;

    assert_eq!(keywords.get(VARS).unwrap().to_string(), "name=\"value\"");
    assert_eq!(keywords.get(SCRIPT_PRE).unwrap().to_string(), "test.py $JOB");
}

#[test]
fn test_dag_render() {
    assert_eq!(make_dag().to_string(), EXPECTED_DAG);
}

#[test]
fn test_file_reference_renders_identically() {
    let mut dag = make_dag();
    dag.nodes[0].submit_description = SubmitRef::from("test.submit");

    assert_eq!(dag.to_string(), EXPECTED_DAG);
}

#[test]
fn test_unknown_nodes_rejected() {
    let mut dag = make_dag();

    assert!(matches!(
        dag.add_dependency(["C"], ["B"]),
        Err(DagError::UnknownNode(ref name)) if name == "C"
    ));
    assert!(matches!(
        dag.add_dependency(["A"], ["C"]),
        Err(DagError::UnknownNode(ref name)) if name == "C"
    ));
    assert_eq!(dag.to_string(), EXPECTED_DAG);
}

#[test]
fn test_dump_cascades_to_submit_descriptions() {
    let dir = tempfile::tempdir().unwrap();
    let mut dag = make_dag();

    dag.filename = dir.path().join("test.dag");
    for node in &mut dag.nodes {
        let submit = node.submit_description.as_inline_mut().unwrap();
        submit.filename = dir.path().join("test.submit");
    }

    dag.dump().unwrap();

    assert!(dag.written_to_disk());
    for node in &dag.nodes {
        assert!(node.submit_description.as_inline().unwrap().written_to_disk());
    }

    assert_eq!(
        fs::read_to_string(dir.path().join("test.submit")).unwrap(),
        format!("{EXPECTED_SUBMIT}\n")
    );
    let expected_dag = EXPECTED_DAG.replace(
        "test.submit",
        &dir.path().join("test.submit").display().to_string(),
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("test.dag")).unwrap(),
        format!("{expected_dag}\n")
    );
}

#[test]
fn test_dump_skips_file_references() {
    let dir = tempfile::tempdir().unwrap();
    let mut dag = DagJob::new(
        dir.path().join("mixed.dag"),
        vec![
            DagNode::new("A", HtCondorSubmit::new(dir.path().join("a.submit"), "a.py")),
            DagNode::new("B", "external.submit"),
        ],
    );

    dag.dump().unwrap();

    assert!(dir.path().join("a.submit").exists());
    assert!(!dir.path().join("external.submit").exists());
    assert!(dir.path().join("mixed.dag").exists());
}

#[test]
fn test_failed_cascade_leaves_dag_unwritten() {
    let dir = tempfile::tempdir().unwrap();
    let mut dag = DagJob::new(
        dir.path().join("broken.dag"),
        vec![
            DagNode::new("A", HtCondorSubmit::new(dir.path().join("a.submit"), "a.py")),
            DagNode::new(
                "B",
                HtCondorSubmit::new(dir.path().join("missing").join("b.submit"), "b.py"),
            ),
        ],
    );

    let result = dag.dump();

    assert!(matches!(result, Err(DagError::IoError(_))));
    assert!(!dag.written_to_disk());
    assert!(!dir.path().join("broken.dag").exists());

    // Earlier writes are not rolled back.
    assert!(dir.path().join("a.submit").exists());
    assert!(dag.nodes[0].submit_description.as_inline().unwrap().written_to_disk());
    assert!(!dag.nodes[1].submit_description.as_inline().unwrap().written_to_disk());
}

#[test]
fn test_multi_task_sbatch_is_not_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("job.sh");

    let mut job = SbatchSubmit::new(&path, "run.sh");
    job.options.insert("ntasks".to_string(), "2".to_string());

    assert!(matches!(
        job.dump(),
        Err(DagError::UnsupportedJobShape { .. })
    ));
    assert!(!path.exists());
}
