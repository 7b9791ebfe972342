//! DAGMan workflows.
//!
//! A [`DagJob`] owns an ordered list of [`DagNode`]s and the PARENT/CHILD
//! edges between them. Edges are checked against the node names when they
//! are added; nothing else about the graph is validated, so cycles are
//! passed through to DAGMan as written.
//!
//! ```
//! use jobscribe::{DagJob, DagNode, HtCondorSubmit, Macros};
//!
//! let job = HtCondorSubmit::new("example.submit", "example.py")
//!     .with_command("arguments", "$(inputfile)");
//!
//! let mut node = DagNode::new("example", job);
//! node.keywords.insert("VARS".into(), Macros::new().with("inputfile", "example.txt").into());
//!
//! let dag = DagJob::new("example.dag", vec![node]);
//! assert_eq!(
//!     dag.to_string(),
//!     "JOB example example.submit\nVARS example inputfile=\"example.txt\""
//! );
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{DagError, DagResult};
use crate::htcondor::HtCondorSubmit;
use crate::ordered::OrderedMap;

/// Keyword name for node macros.
pub const VARS: &str = "VARS";

/// Keyword name for a node's pre-processing script.
pub const SCRIPT_PRE: &str = "SCRIPT PRE";

/// Keyword name for a node's post-processing script.
pub const SCRIPT_POST: &str = "SCRIPT POST";

/// Macros defined for a DAGMan node, rendered as `key="value"` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Macros(pub OrderedMap<String, String>);

impl Macros {
    /// Create an empty macro set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a macro, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.insert(key, value);
        self
    }

    /// Define or redefine a macro.
    pub fn insert(&mut self, key: impl Into<String>, value: impl fmt::Display) -> Option<String> {
        self.0.insert(key.into(), value.to_string())
    }

    /// Look up a macro value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: fmt::Display> FromIterator<(K, V)> for Macros {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut macros = Self::new();
        for (key, value) in iter {
            macros.insert(key, value);
        }
        macros
    }
}

impl fmt::Display for Macros {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{key}=\"{value}\"")?;
        }
        Ok(())
    }
}

/// Script executed before a node's job is submitted or after it completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DagScript {
    /// Shell script or batch file to execute.
    pub executable: String,

    /// Script arguments, in their rendered form.
    pub arguments: Vec<String>,
}

impl DagScript {
    /// Create a script without arguments.
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            arguments: Vec::new(),
        }
    }

    /// Append an argument, builder style.
    pub fn arg(mut self, argument: impl fmt::Display) -> Self {
        self.push_arg(argument);
        self
    }

    /// Append an argument.
    pub fn push_arg(&mut self, argument: impl fmt::Display) {
        self.arguments.push(argument.to_string());
    }
}

impl fmt::Display for DagScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.executable)?;
        for argument in &self.arguments {
            write!(f, " {argument}")?;
        }
        Ok(())
    }
}

/// Value attached to a node keyword such as `VARS` or `SCRIPT PRE`.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKeyword {
    /// Node macros.
    Vars(Macros),
    /// Pre- or post-processing script.
    Script(DagScript),
    /// Any other keyword value, written verbatim (e.g. `RETRY`, `PRIORITY`).
    Value(String),
}

impl NodeKeyword {
    pub fn as_vars(&self) -> Option<&Macros> {
        match self {
            NodeKeyword::Vars(macros) => Some(macros),
            _ => None,
        }
    }

    pub fn as_vars_mut(&mut self) -> Option<&mut Macros> {
        match self {
            NodeKeyword::Vars(macros) => Some(macros),
            _ => None,
        }
    }

    pub fn as_script(&self) -> Option<&DagScript> {
        match self {
            NodeKeyword::Script(script) => Some(script),
            _ => None,
        }
    }

    pub fn as_script_mut(&mut self) -> Option<&mut DagScript> {
        match self {
            NodeKeyword::Script(script) => Some(script),
            _ => None,
        }
    }
}

impl fmt::Display for NodeKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKeyword::Vars(macros) => fmt::Display::fmt(macros, f),
            NodeKeyword::Script(script) => fmt::Display::fmt(script, f),
            NodeKeyword::Value(value) => f.write_str(value),
        }
    }
}

impl From<Macros> for NodeKeyword {
    fn from(macros: Macros) -> Self {
        NodeKeyword::Vars(macros)
    }
}

impl From<DagScript> for NodeKeyword {
    fn from(script: DagScript) -> Self {
        NodeKeyword::Script(script)
    }
}

impl From<String> for NodeKeyword {
    fn from(value: String) -> Self {
        NodeKeyword::Value(value)
    }
}

impl From<&str> for NodeKeyword {
    fn from(value: &str) -> Self {
        NodeKeyword::Value(value.to_string())
    }
}

/// A node's HTCondor submit description: either an existing file or an
/// owned description that is written together with the DAG.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitRef {
    File(PathBuf),
    Inline(HtCondorSubmit),
}

impl SubmitRef {
    /// Path of the submit description file referenced by the node.
    pub fn filename(&self) -> &Path {
        match self {
            SubmitRef::File(path) => path.as_path(),
            SubmitRef::Inline(submit) => submit.filename.as_path(),
        }
    }

    pub fn as_inline(&self) -> Option<&HtCondorSubmit> {
        match self {
            SubmitRef::Inline(submit) => Some(submit),
            SubmitRef::File(_) => None,
        }
    }

    pub fn as_inline_mut(&mut self) -> Option<&mut HtCondorSubmit> {
        match self {
            SubmitRef::Inline(submit) => Some(submit),
            SubmitRef::File(_) => None,
        }
    }
}

impl From<HtCondorSubmit> for SubmitRef {
    fn from(submit: HtCondorSubmit) -> Self {
        SubmitRef::Inline(submit)
    }
}

impl From<PathBuf> for SubmitRef {
    fn from(path: PathBuf) -> Self {
        SubmitRef::File(path)
    }
}

impl From<&Path> for SubmitRef {
    fn from(path: &Path) -> Self {
        SubmitRef::File(path.to_path_buf())
    }
}

impl From<String> for SubmitRef {
    fn from(path: String) -> Self {
        SubmitRef::File(PathBuf::from(path))
    }
}

impl From<&str> for SubmitRef {
    fn from(path: &str) -> Self {
        SubmitRef::File(PathBuf::from(path))
    }
}

/// A DAGMan node.
#[derive(Debug, Clone, PartialEq)]
pub struct DagNode {
    /// Identifies the node within the DAG input file and in output messages.
    /// Uniqueness within a workflow is up to the caller.
    pub name: String,

    /// Submit description of the node's job.
    pub submit_description: SubmitRef,

    /// Node keywords, rendered in insertion order.
    pub keywords: OrderedMap<String, NodeKeyword>,
}

impl DagNode {
    /// Create a node without keywords.
    pub fn new(name: impl Into<String>, submit_description: impl Into<SubmitRef>) -> Self {
        Self {
            name: name.into(),
            submit_description: submit_description.into(),
            keywords: OrderedMap::new(),
        }
    }

    /// Attach a keyword value, builder style.
    pub fn with_keyword(mut self, keyword: impl Into<String>, value: impl Into<NodeKeyword>) -> Self {
        self.keywords.insert(keyword.into(), value.into());
        self
    }

    /// Attach `VARS`.
    pub fn with_vars(self, macros: Macros) -> Self {
        self.with_keyword(VARS, macros)
    }

    /// Attach `SCRIPT PRE`.
    pub fn with_pre_script(self, script: DagScript) -> Self {
        self.with_keyword(SCRIPT_PRE, script)
    }

    /// Attach `SCRIPT POST`.
    pub fn with_post_script(self, script: DagScript) -> Self {
        self.with_keyword(SCRIPT_POST, script)
    }
}

/// Paths are rendered with [`Path::display`]; [`DagJob::dump`] refuses
/// paths that would not survive it.
impl fmt::Display for DagNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "JOB {} {}",
            self.name,
            self.submit_description.filename().display()
        )?;
        for (keyword, value) in self.keywords.iter() {
            write!(f, "\n{keyword} {} {value}", self.name)?;
        }
        Ok(())
    }
}

/// A DAGMan input file: nodes plus PARENT/CHILD dependencies.
#[derive(Debug, Clone, PartialEq)]
pub struct DagJob {
    /// Output path of the DAGMan input file.
    pub filename: PathBuf,

    /// DAG nodes, rendered in order.
    pub nodes: Vec<DagNode>,

    dependencies: OrderedMap<Vec<String>, Vec<String>>,
    written_to_disk: bool,
}

impl DagJob {
    /// Create a DAG without dependencies.
    pub fn new(filename: impl Into<PathBuf>, nodes: Vec<DagNode>) -> Self {
        Self {
            filename: filename.into(),
            nodes,
            dependencies: OrderedMap::new(),
            written_to_disk: false,
        }
    }

    /// Find a node by name.
    pub fn node(&self, name: &str) -> Option<&DagNode> {
        self.nodes.iter().find(|node| node.name == name)
    }

    /// Find a node by name, mutably.
    pub fn node_mut(&mut self, name: &str) -> Option<&mut DagNode> {
        self.nodes.iter_mut().find(|node| node.name == name)
    }

    /// Add a dependency: every `children` node waits for all `parents`.
    ///
    /// Fails with [`DagError::UnknownNode`] if any name is not a node of
    /// this DAG, in which case the DAG is left untouched. Adding the same
    /// `parents` group again replaces its children.
    pub fn add_dependency<P, C>(&mut self, parents: P, children: C) -> DagResult<()>
    where
        P: IntoIterator,
        P::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let parents: Vec<String> = parents.into_iter().map(Into::into).collect();
        let children: Vec<String> = children.into_iter().map(Into::into).collect();

        self.ensure_known(&parents)?;
        self.ensure_known(&children)?;

        debug!(?parents, ?children, "adding DAG dependency");
        if let Some(previous) = self.dependencies.insert(parents, children) {
            warn!(?previous, "dependency replaced children of an existing parent group");
        }

        Ok(())
    }

    fn ensure_known(&self, names: &[String]) -> DagResult<()> {
        match names.iter().find(|name| self.node(name).is_none()) {
            Some(unknown) => Err(DagError::UnknownNode(unknown.clone())),
            None => Ok(()),
        }
    }

    /// Dependencies as `(parents, children)` with each group space-joined,
    /// in insertion order.
    pub fn dependencies(&self) -> Vec<(String, String)> {
        self.dependencies
            .iter()
            .map(|(parents, children)| (parents.join(" "), children.join(" ")))
            .collect()
    }

    /// Write every inline submit description, then the DAG input file.
    ///
    /// A failing submit description aborts before the DAG file is written;
    /// files written before the failure are left in place. Submit file
    /// paths are checked up front: a path that is not UTF-8 cannot be named
    /// in the DAG file and fails with [`DagError::NonUtf8Path`] before
    /// anything is written.
    pub fn dump(&mut self) -> DagResult<()> {
        if let Some(path) = self
            .nodes
            .iter()
            .map(|node| node.submit_description.filename())
            .find(|path| path.to_str().is_none())
        {
            return Err(DagError::NonUtf8Path(path.to_path_buf()));
        }

        for node in &mut self.nodes {
            if let SubmitRef::Inline(submit) = &mut node.submit_description {
                submit.dump()?;
            }
        }

        fs::write(&self.filename, format!("{self}\n"))?;
        self.written_to_disk = true;

        info!(
            path = %self.filename.display(),
            nodes = self.nodes.len(),
            dependencies = self.dependencies.len(),
            "wrote DAGMan input file"
        );
        Ok(())
    }

    /// Whether the DAG input file was written to disk.
    pub fn written_to_disk(&self) -> bool {
        self.written_to_disk
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl fmt::Display for DagJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines: Vec<String> = self.nodes.iter().map(ToString::to_string).collect();
        lines.extend(
            self.dependencies()
                .into_iter()
                .map(|(parents, children)| format!("PARENT {parents} CHILD {children}")),
        );
        f.write_str(&lines.join("\n"))
    }
}

/// Builder for constructing DAGs fluently.
pub struct DagJobBuilder {
    dag: DagJob,
}

impl DagJobBuilder {
    /// Create a new builder for a DAG written to `filename`.
    pub fn new(filename: impl Into<PathBuf>) -> Self {
        Self {
            dag: DagJob::new(filename, Vec::new()),
        }
    }

    /// Add a node.
    pub fn node(mut self, node: DagNode) -> Self {
        self.dag.nodes.push(node);
        self
    }

    /// Add a dependency between nodes added so far.
    pub fn dependency<P, C>(mut self, parents: P, children: C) -> DagResult<Self>
    where
        P: IntoIterator,
        P::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        self.dag.add_dependency(parents, children)?;
        Ok(self)
    }

    /// Build the DAG.
    pub fn build(self) -> DagJob {
        self.dag
    }
}
