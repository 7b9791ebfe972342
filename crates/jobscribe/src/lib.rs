//! jobscribe: job-submission artifacts for HTCondor, DAGMan and SLURM
//!
//! This crate turns in-memory job descriptions into the text files a
//! workload manager reads. It does not submit or run anything.
//!
//! # Overview
//!
//! | Artifact | Type | Written by |
//! |----------|------|------------|
//! | HTCondor submit description | [`HtCondorSubmit`] | [`HtCondorSubmit::dump`] |
//! | DAGMan input file | [`DagJob`] | [`DagJob::dump`] (also writes inline submit descriptions) |
//! | SLURM batch script | [`SbatchSubmit`] | [`SbatchSubmit::dump`] |
//!
//! Every map in the model keeps insertion order, so rendering is
//! deterministic.
//!
//! # Example: DAG with dependencies
//!
//! ```
//! use jobscribe::{DagJob, DagNode, DagScript, HtCondorSubmit, Macros};
//!
//! let job = HtCondorSubmit::new("test.submit", "test.py").with_command("args", "\"$(name)\"");
//!
//! let a = DagNode::new("A", job.clone())
//!     .with_vars(Macros::new().with("name", "value"))
//!     .with_pre_script(DagScript::new("test.py").arg("$JOB"));
//! let b = DagNode::new("B", job);
//!
//! let mut dag = DagJob::new("test.dag", vec![a, b]);
//! dag.add_dependency(["A"], ["B"])?;
//!
//! assert_eq!(
//!     dag.to_string(),
//!     "JOB A test.submit\n\
//!      VARS A name=\"value\"\n\
//!      SCRIPT PRE A test.py $JOB\n\
//!      JOB B test.submit\n\
//!      PARENT A CHILD B"
//! );
//! # Ok::<(), jobscribe::DagError>(())
//! ```
//!
//! # Example: SLURM batch script
//!
//! ```no_run
//! use jobscribe::SbatchSubmit;
//!
//! let mut job = SbatchSubmit::new("analyse.sh", "bin/analyse")
//!     .with_arguments("--input data.h5")
//!     .with_option("partition", "short")
//!     .with_time_limit(90);
//! job.transfer_input_files.push("data.h5".into());
//! job.dump()?;
//! # Ok::<(), jobscribe::DagError>(())
//! ```

pub mod dagman;
pub mod error;
pub mod htcondor;
pub mod manifest;
pub mod ordered;
pub mod slurm;

// Re-exports
pub use dagman::{DagJob, DagJobBuilder, DagNode, DagScript, Macros, NodeKeyword, SubmitRef};
pub use error::{DagError, DagResult};
pub use htcondor::HtCondorSubmit;
pub use manifest::{ScalarValue, WorkflowManifest};
pub use ordered::OrderedMap;
pub use slurm::SbatchSubmit;
