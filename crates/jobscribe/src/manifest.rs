//! Workflow manifests: a DAG, its nodes and their submit descriptions in
//! one YAML or JSON document.
//!
//! ```yaml
//! dag: example.dag
//! submit:
//!   job:
//!     file: example.submit
//!     executable: example.py
//!     commands:
//!       arguments: "$(inputfile)"
//! nodes:
//!   - name: A
//!     submit: job
//!     vars: {inputfile: a.txt}
//!     pre: {executable: pre.sh, arguments: ["$JOB"]}
//!   - name: B
//!     file: existing.submit
//! dependencies:
//!   - parents: [A]
//!     children: [B]
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::dagman::{DagJob, DagNode, DagScript, Macros, SCRIPT_POST, SCRIPT_PRE, VARS};
use crate::error::{DagError, DagResult};
use crate::htcondor::HtCondorSubmit;
use crate::ordered::OrderedMap;

/// Top-level manifest document.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkflowManifest {
    /// Path of the DAGMan input file.
    pub dag: PathBuf,

    /// Named HTCondor submit descriptions that nodes can refer to.
    #[serde(default)]
    pub submit: OrderedMap<String, SubmitSpec>,

    pub nodes: Vec<NodeSpec>,

    #[serde(default)]
    pub dependencies: Vec<DependencySpec>,
}

/// An HTCondor submit description.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmitSpec {
    /// Path of the submit description file.
    pub file: PathBuf,
    pub executable: String,
    #[serde(default = "default_queue")]
    pub queue: i64,
    #[serde(default)]
    pub commands: OrderedMap<String, ScalarValue>,
}

fn default_queue() -> i64 {
    1
}

/// A DAG node.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeSpec {
    pub name: String,

    /// Key into [`WorkflowManifest::submit`].
    #[serde(default)]
    pub submit: Option<String>,

    /// Existing submit description file.
    #[serde(default)]
    pub file: Option<PathBuf>,

    #[serde(default)]
    pub vars: Option<OrderedMap<String, ScalarValue>>,
    #[serde(default)]
    pub pre: Option<ScriptSpec>,
    #[serde(default)]
    pub post: Option<ScriptSpec>,

    /// Any other node keyword, written verbatim.
    #[serde(default)]
    pub keywords: OrderedMap<String, ScalarValue>,
}

/// A command, macro or keyword value. JSON keeps numbers and booleans
/// typed, so every scalar is accepted and rendered as written.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Str(value) => f.write_str(value),
            ScalarValue::Int(value) => write!(f, "{value}"),
            ScalarValue::Float(value) => write!(f, "{value:?}"),
            ScalarValue::Bool(value) => write!(f, "{value}"),
        }
    }
}

/// A pre- or post-processing script.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptSpec {
    pub executable: String,
    #[serde(default)]
    pub arguments: Vec<String>,
}

/// A PARENT/CHILD edge group.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependencySpec {
    pub parents: Vec<String>,
    pub children: Vec<String>,
}

impl WorkflowManifest {
    /// Parse a YAML manifest.
    pub fn from_yaml_str(source: &str) -> DagResult<Self> {
        Ok(serde_yaml_ng::from_str(source)?)
    }

    /// Parse a JSON manifest.
    pub fn from_json_str(source: &str) -> DagResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Load a manifest, choosing JSON for `.json` files and YAML otherwise.
    pub fn from_path(path: impl AsRef<Path>) -> DagResult<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&source)
        } else {
            Self::from_yaml_str(&source)
        }
    }

    /// Build the DAG described by this manifest.
    ///
    /// With a `base_dir`, the DAG file and every inline submit file are
    /// placed below it; external submit files are referenced unchanged.
    pub fn into_dag(self, base_dir: Option<&Path>) -> DagResult<DagJob> {
        let place = |path: PathBuf| match base_dir {
            Some(dir) => dir.join(path),
            None => path,
        };

        let nodes = self
            .nodes
            .into_iter()
            .map(|spec| build_node(spec, &self.submit, &place))
            .collect::<DagResult<Vec<_>>>()?;

        let mut dag = DagJob::new(place(self.dag), nodes);
        for dependency in self.dependencies {
            dag.add_dependency(dependency.parents, dependency.children)?;
        }

        tracing::debug!(nodes = dag.len(), "built DAG from manifest");
        Ok(dag)
    }
}

fn build_node(
    spec: NodeSpec,
    submits: &OrderedMap<String, SubmitSpec>,
    place: &impl Fn(PathBuf) -> PathBuf,
) -> DagResult<DagNode> {
    let mut node = match (spec.submit, spec.file) {
        (Some(key), None) => {
            let submit = submits.get(&key).ok_or_else(|| {
                DagError::InvalidManifest(format!(
                    "node '{}' refers to unknown submit description '{key}'",
                    spec.name
                ))
            })?;
            let inline = HtCondorSubmit::with_commands(
                place(submit.file.clone()),
                &submit.executable,
                submit.queue,
                submit.commands.clone(),
            );
            DagNode::new(spec.name, inline)
        }
        (None, Some(file)) => DagNode::new(spec.name, file),
        _ => {
            return Err(DagError::InvalidManifest(format!(
                "node '{}' must set exactly one of `submit` or `file`",
                spec.name
            )));
        }
    };

    if let Some(vars) = spec.vars {
        node = node.with_keyword(VARS, vars.into_iter().collect::<Macros>());
    }
    if let Some(pre) = spec.pre {
        node = node.with_keyword(SCRIPT_PRE, DagScript::from(pre));
    }
    if let Some(post) = spec.post {
        node = node.with_keyword(SCRIPT_POST, DagScript::from(post));
    }
    for (keyword, value) in spec.keywords {
        node = node.with_keyword(keyword, value.to_string());
    }

    Ok(node)
}

impl From<ScriptSpec> for DagScript {
    fn from(spec: ScriptSpec) -> Self {
        DagScript {
            executable: spec.executable,
            arguments: spec.arguments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
dag: test.dag
submit:
  job:
    file: test.submit
    executable: test.py
    commands:
      args: '"$(name)"'
nodes:
  - name: A
    submit: job
    vars: {name: value}
    pre: {executable: test.py, arguments: ["$JOB"]}
  - name: B
    file: test.submit
    keywords: {RETRY: "2"}
dependencies:
  - parents: [A]
    children: [B]
"#;

    #[test]
    fn test_yaml_manifest_into_dag() {
        let dag = WorkflowManifest::from_yaml_str(MANIFEST)
            .unwrap()
            .into_dag(None)
            .unwrap();

        assert_eq!(
            dag.to_string(),
            "JOB A test.submit\nVARS A name=\"value\"\nSCRIPT PRE A test.py $JOB\nJOB B test.submit\nRETRY B 2\nPARENT A CHILD B"
        );

        let inline = dag.nodes[0].submit_description.as_inline().unwrap();
        assert_eq!(
            inline.to_string(),
            "universe = vanilla\nexecutable = test.py\nargs = \"$(name)\"\nqueue 1"
        );
        assert!(dag.nodes[1].submit_description.as_inline().is_none());
    }

    #[test]
    fn test_json_manifest() {
        let manifest = WorkflowManifest::from_json_str(
            r#"{"dag": "x.dag", "nodes": [{"name": "X", "file": "x.submit"}]}"#,
        )
        .unwrap();

        let dag = manifest.into_dag(None).unwrap();
        assert_eq!(dag.to_string(), "JOB X x.submit");
    }

    #[test]
    fn test_json_manifest_scalar_values() {
        let manifest = WorkflowManifest::from_json_str(
            r#"{
                "dag": "x.dag",
                "submit": {
                    "job": {
                        "file": "x.submit",
                        "executable": "x.py",
                        "commands": {"request_memory": 2048, "request_gpus": 0.5, "getenv": true}
                    }
                },
                "nodes": [
                    {"name": "X", "submit": "job", "vars": {"seed": 42, "name": "run"}, "keywords": {"RETRY": 3}}
                ]
            }"#,
        )
        .unwrap();

        let dag = manifest.into_dag(None).unwrap();
        assert_eq!(
            dag.to_string(),
            "JOB X x.submit\nVARS X seed=\"42\" name=\"run\"\nRETRY X 3"
        );

        let inline = dag.nodes[0].submit_description.as_inline().unwrap();
        assert_eq!(
            inline.to_string(),
            "universe = vanilla\nexecutable = x.py\nrequest_memory = 2048\nrequest_gpus = 0.5\ngetenv = true\nqueue 1"
        );
    }

    #[test]
    fn test_scalar_value_display() {
        assert_eq!(ScalarValue::Str("a b".into()).to_string(), "a b");
        assert_eq!(ScalarValue::Int(-3).to_string(), "-3");
        assert_eq!(ScalarValue::Float(2.0).to_string(), "2.0");
        assert_eq!(ScalarValue::Bool(false).to_string(), "false");
    }

    #[test]
    fn test_base_dir_applies_to_owned_files() {
        let dag = WorkflowManifest::from_yaml_str(MANIFEST)
            .unwrap()
            .into_dag(Some(Path::new("/out")))
            .unwrap();

        assert_eq!(dag.filename, PathBuf::from("/out/test.dag"));
        assert_eq!(
            dag.nodes[0].submit_description.filename(),
            Path::new("/out/test.submit")
        );
        assert_eq!(
            dag.nodes[1].submit_description.filename(),
            Path::new("test.submit")
        );
    }

    #[test]
    fn test_node_needs_one_submit_source() {
        let manifest = WorkflowManifest::from_yaml_str(
            "dag: x.dag\nnodes:\n  - name: X\n",
        )
        .unwrap();
        assert!(matches!(
            manifest.into_dag(None),
            Err(DagError::InvalidManifest(_))
        ));
    }

    #[test]
    fn test_unknown_submit_key() {
        let manifest = WorkflowManifest::from_yaml_str(
            "dag: x.dag\nnodes:\n  - name: X\n    submit: missing\n",
        )
        .unwrap();
        let err = manifest.into_dag(None).unwrap_err();
        assert!(err.to_string().contains("unknown submit description 'missing'"));
    }

    #[test]
    fn test_unknown_dependency_node() {
        let manifest = WorkflowManifest::from_yaml_str(
            "dag: x.dag\nnodes:\n  - name: X\n    file: x.submit\ndependencies:\n  - parents: [X]\n    children: [Y]\n",
        )
        .unwrap();
        assert!(matches!(
            manifest.into_dag(None),
            Err(DagError::UnknownNode(ref name)) if name == "Y"
        ));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = WorkflowManifest::from_yaml_str("dag: x.dag\nnodes: []\nextra: 1\n");
        assert!(matches!(result, Err(DagError::YamlError(_))));
    }
}
