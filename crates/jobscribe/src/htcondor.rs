//! HTCondor submit descriptions.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::DagResult;
use crate::ordered::OrderedMap;

/// Submit description of a single HTCondor job.
///
/// `commands` always starts out with `universe = vanilla` and the
/// executable; callers may override either or add any other command.
///
/// ```
/// use jobscribe::HtCondorSubmit;
///
/// let mut job = HtCondorSubmit::new("example.submit", "example.py");
/// job.commands.insert("initialdir".into(), "$ENV(HOME)".into());
///
/// assert_eq!(
///     job.to_string(),
///     "universe = vanilla\nexecutable = example.py\ninitialdir = $ENV(HOME)\nqueue 1"
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct HtCondorSubmit {
    /// Output path of the submit description file.
    pub filename: PathBuf,

    /// Number of jobs to queue. Not validated.
    pub queue: i64,

    /// Submit description commands, rendered in insertion order.
    pub commands: OrderedMap<String, String>,

    written_to_disk: bool,
}

impl HtCondorSubmit {
    /// Create a submit description queuing one vanilla-universe job.
    pub fn new(filename: impl Into<PathBuf>, executable: impl fmt::Display) -> Self {
        let mut commands = OrderedMap::new();
        commands.insert("universe".to_string(), "vanilla".to_string());
        commands.insert("executable".to_string(), executable.to_string());

        Self {
            filename: filename.into(),
            queue: 1,
            commands,
            written_to_disk: false,
        }
    }

    /// Create a submit description and overlay `extra` commands on the
    /// defaults. Later keys win, including `universe` and `executable`.
    pub fn with_commands<I, K, V>(
        filename: impl Into<PathBuf>,
        executable: impl fmt::Display,
        queue: i64,
        extra: I,
    ) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: fmt::Display,
    {
        let mut submit = Self::new(filename, executable).with_queue(queue);
        submit
            .commands
            .extend(extra.into_iter().map(|(k, v)| (k.into(), v.to_string())));
        submit
    }

    /// Set the number of jobs to queue.
    pub fn with_queue(mut self, queue: i64) -> Self {
        self.queue = queue;
        self
    }

    /// Set a single submit command.
    pub fn with_command(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.commands.insert(key.into(), value.to_string());
        self
    }

    /// The executable command, if it has not been removed.
    pub fn executable(&self) -> Option<&str> {
        self.commands.get("executable").map(String::as_str)
    }

    /// Output path of the submit description file.
    pub fn filename(&self) -> &Path {
        &self.filename
    }

    /// Write the submit description to `filename`.
    pub fn dump(&mut self) -> DagResult<()> {
        fs::write(&self.filename, format!("{self}\n"))?;
        self.written_to_disk = true;

        tracing::info!(path = %self.filename.display(), "wrote HTCondor submit description");
        Ok(())
    }

    /// Whether the submit description was written to disk.
    pub fn written_to_disk(&self) -> bool {
        self.written_to_disk
    }
}

impl fmt::Display for HtCondorSubmit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.commands.iter() {
            writeln!(f, "{key} = {value}")?;
        }
        write!(f, "queue {}", self.queue)
    }
}
