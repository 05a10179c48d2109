//! Origin resolution.
//!
//! An origin designates where an executable comes from: an `https` URL, a
//! directory holding a manifest, a manifest file, or a plain executable.
//! Resolution classifies the origin, follows manifest entrypoints and
//! subcommand dispatch, and ends at a concrete [`Invocation`].
//!
//! Precedence, first match wins:
//!
//! ```text
//! https URL            -> fetch into a private temp file, run it
//! directory            -> locate its lumen.json, classify that
//! file != lumen.json   -> run it with the args
//! manifest.entrypoint  -> classify the entrypoint, run it with the args
//! manifest.subcommands -> args[0] picks the subcommand, rest are passed on
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use walkdir::WalkDir;

use crate::error::{LumenError, LumenResult};
use crate::manifest::{Entry, Manifest, Subcommand, MANIFEST_NAME};
use crate::runner::Invocation;

/// Maximum number of indirections followed before giving up.
const MAX_DEPTH: usize = 16;

/// Name of the file a fetched script is written to.
const REMOTE_SCRIPT_NAME: &str = "lumen-command";

/// Response of a script download.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Downloads remote scripts.
pub trait ScriptFetch: Send + Sync {
    fn get(&self, url: &str) -> LumenResult<FetchResponse>;
}

/// Classification of an origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Remote(String),
    Directory(PathBuf),
    Executable(PathBuf),
    ManifestEntrypoint {
        dir: PathBuf,
        entrypoint: String,
    },
    ManifestDispatcher {
        dir: PathBuf,
        subcommands: BTreeMap<String, Subcommand>,
    },
}

impl Origin {
    /// Classify an origin string given on the command line.
    pub fn classify(origin: &str) -> LumenResult<Self> {
        Self::classify_relative(origin, Path::new(""))
    }

    /// Classify `target`, resolving relative paths against `base`.
    pub fn classify_relative(target: &str, base: &Path) -> LumenResult<Self> {
        if is_remote(target) {
            return Ok(Origin::Remote(target.to_string()));
        }
        Self::classify_path(&base.join(target))
    }

    /// Classify a local path.
    pub fn classify_path(path: &Path) -> LumenResult<Self> {
        let metadata = fs::metadata(path).map_err(|e| {
            LumenError::Io(std::io::Error::new(
                e.kind(),
                format!("{}: {}", path.display(), e),
            ))
        })?;

        if metadata.is_dir() {
            return Ok(Origin::Directory(path.to_path_buf()));
        }

        if path.file_name().and_then(|n| n.to_str()) != Some(MANIFEST_NAME) {
            return Ok(Origin::Executable(path.to_path_buf()));
        }

        let manifest = Manifest::load(path)?;
        let dir = path.parent().unwrap_or(Path::new("")).to_path_buf();
        Self::from_entry(&manifest.entry, dir, &path.display().to_string())
    }

    /// Turn a manifest or command entry into an origin. `label` names the
    /// owner in the error raised when the entry is empty.
    pub fn from_entry(entry: &Entry, dir: PathBuf, label: &str) -> LumenResult<Self> {
        if let Some(ref entrypoint) = entry.entrypoint {
            return Ok(Origin::ManifestEntrypoint {
                dir,
                entrypoint: entrypoint.clone(),
            });
        }

        if entry.subcommands.is_empty() {
            return Err(LumenError::NoEntrypoint(label.to_string()));
        }

        Ok(Origin::ManifestDispatcher {
            dir,
            subcommands: entry.subcommands.clone(),
        })
    }
}

/// A resolved invocation, plus the scratch directory of a fetched script.
///
/// The scratch directory is removed when this value is dropped, so keep it
/// alive until the process has finished.
#[derive(Debug)]
pub struct Resolved {
    pub invocation: Invocation,
    scratch: Option<TempDir>,
}

impl Resolved {
    fn local(program: PathBuf, args: Vec<String>) -> Self {
        Self {
            invocation: Invocation::new(program, args),
            scratch: None,
        }
    }

    /// Whether the invocation runs a downloaded script.
    pub fn is_remote(&self) -> bool {
        self.scratch.is_some()
    }
}

/// Resolves origins into invocations.
#[derive(Clone)]
pub struct Resolver {
    fetcher: Arc<dyn ScriptFetch>,
}

impl Resolver {
    pub fn new(fetcher: Arc<dyn ScriptFetch>) -> Self {
        Self { fetcher }
    }

    /// Resolve an origin string with trailing args and optional stdin input.
    pub fn resolve(
        &self,
        origin: &str,
        args: Vec<String>,
        input: Option<Vec<u8>>,
    ) -> LumenResult<Resolved> {
        let classified = Origin::classify(origin)?;
        self.resolve_origin(classified, args, input)
    }

    /// Resolve an already classified origin.
    pub fn resolve_origin(
        &self,
        origin: Origin,
        args: Vec<String>,
        input: Option<Vec<u8>>,
    ) -> LumenResult<Resolved> {
        let mut resolved = self.follow(origin, args, 0)?;
        resolved.invocation.input = input;
        Ok(resolved)
    }

    fn follow(&self, origin: Origin, args: Vec<String>, depth: usize) -> LumenResult<Resolved> {
        if depth > MAX_DEPTH {
            return Err(LumenError::ResolutionDepth(format!("{:?}", origin)));
        }
        tracing::debug!(?origin, ?args, depth, "resolving origin");

        match origin {
            Origin::Remote(url) => self.fetch(&url, args),
            Origin::Directory(dir) => {
                let manifest = locate_manifest(&dir)?;
                self.follow(Origin::classify_path(&manifest)?, args, depth + 1)
            }
            Origin::Executable(path) => Ok(Resolved::local(path, args)),
            Origin::ManifestEntrypoint { dir, entrypoint } => {
                let target = Origin::classify_relative(&entrypoint, &dir)?;
                self.follow(target, args, depth + 1)
            }
            Origin::ManifestDispatcher { dir, subcommands } => {
                let mut args = args.into_iter();
                let Some(name) = args.next() else {
                    return Err(LumenError::Usage {
                        message: usage_message(&subcommands),
                    });
                };

                let subcommand = subcommands
                    .get(&name)
                    .ok_or_else(|| LumenError::SubcommandNotFound(name.clone()))?;

                let target = Origin::classify_relative(&subcommand.entrypoint, &dir)?;
                self.follow(target, args.collect(), depth + 1)
            }
        }
    }

    fn fetch(&self, url: &str, args: Vec<String>) -> LumenResult<Resolved> {
        let response = self.fetcher.get(url)?;
        if response.status != 200 {
            return Err(LumenError::FetchStatus(response.status));
        }

        let scratch = tempfile::Builder::new().prefix("lumen").tempdir()?;
        let script = scratch.path().join(REMOTE_SCRIPT_NAME);
        write_executable(&script, &response.body)?;
        tracing::debug!(url, path = %script.display(), "fetched remote script");

        Ok(Resolved {
            invocation: Invocation::new(script, args),
            scratch: Some(scratch),
        })
    }
}

/// Find the single manifest of an extension directory.
///
/// The directory itself is checked first; otherwise exactly one manifest must
/// exist one level below it.
pub fn locate_manifest(dir: &Path) -> LumenResult<PathBuf> {
    let direct = dir.join(MANIFEST_NAME);
    if direct.is_file() {
        return Ok(direct);
    }

    // Hidden directories are pruned while walking, so the walk has to start
    // at depth 0 for the filter to see them.
    let mut candidates: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(2)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()))
        .filter_map(|e| e.ok())
        .filter(|e| e.depth() == 2 && e.file_type().is_file() && e.file_name() == MANIFEST_NAME)
        .map(|e| e.into_path())
        .collect();
    candidates.sort();

    match candidates.len() {
        0 => Err(LumenError::ManifestNotFound {
            dir: dir.to_path_buf(),
            manifest: MANIFEST_NAME,
        }),
        1 => Ok(candidates.remove(0)),
        _ => Err(LumenError::AmbiguousManifest {
            dir: dir.to_path_buf(),
            candidates,
        }),
    }
}

fn is_remote(origin: &str) -> bool {
    url::Url::parse(origin)
        .map(|u| u.scheme() == "https" && u.has_host())
        .unwrap_or(false)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().map(|s| s.starts_with('.')).unwrap_or(false)
}

fn usage_message(subcommands: &BTreeMap<String, Subcommand>) -> String {
    let mut message = String::from("No subcommand provided\nSubcommands:");
    for name in subcommands.keys() {
        message.push_str("\n  - ");
        message.push_str(name);
    }
    message
}

fn write_executable(path: &Path, body: &[u8]) -> LumenResult<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o755);
    }

    let mut file = options.open(path)?;
    file.write_all(body)?;
    file.sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct StubFetch {
        status: u16,
        body: &'static str,
        requested: Mutex<Vec<String>>,
    }

    impl StubFetch {
        fn new(status: u16, body: &'static str) -> Arc<Self> {
            Arc::new(Self {
                status,
                body,
                requested: Mutex::new(Vec::new()),
            })
        }
    }

    impl ScriptFetch for StubFetch {
        fn get(&self, url: &str) -> LumenResult<FetchResponse> {
            self.requested.lock().unwrap().push(url.to_string());
            Ok(FetchResponse {
                status: self.status,
                body: self.body.as_bytes().to_vec(),
            })
        }
    }

    fn resolver() -> Resolver {
        Resolver::new(StubFetch::new(404, ""))
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_classify_https_url_as_remote() {
        assert_eq!(
            Origin::classify("https://example.com/script.sh").unwrap(),
            Origin::Remote("https://example.com/script.sh".to_string())
        );
    }

    #[test]
    fn test_http_url_is_not_remote() {
        // Plain http is treated as a (missing) local path.
        assert!(Origin::classify("http://example.com/script.sh").is_err());
    }

    #[test]
    fn test_plain_executable_keeps_args_and_input() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("hello.sh");
        write(&script, "#!/bin/sh\necho hello\n");

        let resolved = resolver()
            .resolve(
                script.to_str().unwrap(),
                args(&["a", "b"]),
                Some(b"input".to_vec()),
            )
            .unwrap();

        assert_eq!(resolved.invocation.program, script);
        assert_eq!(resolved.invocation.args, args(&["a", "b"]));
        assert_eq!(resolved.invocation.input.as_deref(), Some(&b"input"[..]));
        assert!(!resolved.is_remote());
    }

    #[test]
    fn test_directory_with_entrypoint_manifest() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join(MANIFEST_NAME), r#"{"entrypoint": "main.sh"}"#);
        write(&dir.path().join("main.sh"), "#!/bin/sh\n");

        let resolved = resolver()
            .resolve(dir.path().to_str().unwrap(), args(&["x"]), None)
            .unwrap();

        assert_eq!(resolved.invocation.program, dir.path().join("main.sh"));
        assert_eq!(resolved.invocation.args, args(&["x"]));
    }

    #[test]
    fn test_entrypoint_wins_over_subcommands() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join(MANIFEST_NAME),
            r#"{
                "entrypoint": "main.sh",
                "subcommands": {"list": {"entrypoint": "list.sh"}}
            }"#,
        );
        write(&dir.path().join("main.sh"), "");
        write(&dir.path().join("list.sh"), "");

        let resolved = resolver()
            .resolve(dir.path().to_str().unwrap(), args(&["list"]), None)
            .unwrap();

        assert_eq!(resolved.invocation.program, dir.path().join("main.sh"));
        assert_eq!(resolved.invocation.args, args(&["list"]));
    }

    #[test]
    fn test_dispatcher_consumes_subcommand_name() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join(MANIFEST_NAME),
            r#"{"subcommands": {"list": {"entrypoint": "bin/list.sh"}}}"#,
        );
        write(&dir.path().join("bin/list.sh"), "");

        let resolved = resolver()
            .resolve(
                dir.path().join(MANIFEST_NAME).to_str().unwrap(),
                args(&["list", "--all"]),
                Some(b"{}".to_vec()),
            )
            .unwrap();

        assert_eq!(resolved.invocation.program, dir.path().join("bin/list.sh"));
        assert_eq!(resolved.invocation.args, args(&["--all"]));
        assert_eq!(resolved.invocation.input.as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn test_dispatcher_without_args_is_usage_error() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join(MANIFEST_NAME),
            r#"{"subcommands": {"list": {"entrypoint": "list.sh"}, "show": {"entrypoint": "show.sh"}}}"#,
        );

        let err = resolver()
            .resolve(dir.path().to_str().unwrap(), Vec::new(), None)
            .unwrap_err();

        match err {
            LumenError::Usage { ref message } => {
                assert!(message.contains("- list"));
                assert!(message.contains("- show"));
            }
            other => panic!("expected usage error, got {:?}", other),
        }
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_unknown_subcommand_is_hard_error() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join(MANIFEST_NAME),
            r#"{"subcommands": {"list": {"entrypoint": "list.sh"}}}"#,
        );

        let err = resolver()
            .resolve(dir.path().to_str().unwrap(), args(&["lsit"]), None)
            .unwrap_err();
        assert!(matches!(err, LumenError::SubcommandNotFound(ref name) if name == "lsit"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_empty_manifest_fails_loudly() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join(MANIFEST_NAME), r#"{"title": "Nothing"}"#);

        let err = resolver()
            .resolve(dir.path().to_str().unwrap(), args(&["x"]), None)
            .unwrap_err();
        assert!(matches!(err, LumenError::NoEntrypoint(_)));
    }

    #[test]
    fn test_entrypoint_into_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join(MANIFEST_NAME), r#"{"entrypoint": "nested"}"#);
        write(
            &dir.path().join("nested").join(MANIFEST_NAME),
            r#"{"subcommands": {"run": {"entrypoint": "run.sh"}}}"#,
        );
        write(&dir.path().join("nested/run.sh"), "");

        let resolved = resolver()
            .resolve(dir.path().to_str().unwrap(), args(&["run", "fast"]), None)
            .unwrap();

        assert_eq!(resolved.invocation.program, dir.path().join("nested/run.sh"));
        assert_eq!(resolved.invocation.args, args(&["fast"]));
    }

    #[test]
    fn test_self_referencing_manifest_hits_depth_limit() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join(MANIFEST_NAME), r#"{"entrypoint": "."}"#);

        let err = resolver()
            .resolve(dir.path().to_str().unwrap(), Vec::new(), None)
            .unwrap_err();
        assert!(matches!(err, LumenError::ResolutionDepth(_)));
    }

    #[test]
    fn test_locate_manifest_one_level_down() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("ext").join(MANIFEST_NAME), "{}");
        write(&dir.path().join(".git").join(MANIFEST_NAME), "{}");
        write(&dir.path().join(".cache").join(MANIFEST_NAME), "{}");

        assert_eq!(
            locate_manifest(dir.path()).unwrap(),
            dir.path().join("ext").join(MANIFEST_NAME)
        );
    }

    #[test]
    fn test_locate_manifest_missing_and_ambiguous() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            locate_manifest(dir.path()),
            Err(LumenError::ManifestNotFound { .. })
        ));

        write(&dir.path().join("a").join(MANIFEST_NAME), "{}");
        write(&dir.path().join("b").join(MANIFEST_NAME), "{}");
        match locate_manifest(dir.path()) {
            Err(LumenError::AmbiguousManifest { candidates, .. }) => assert_eq!(candidates.len(), 2),
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn test_remote_script_written_executable_and_cleaned_up() {
        let fetcher = StubFetch::new(200, "#!/bin/sh\necho remote\n");
        let resolver = Resolver::new(fetcher.clone());

        let resolved = resolver
            .resolve("https://example.com/hello.sh", args(&["one"]), None)
            .unwrap();
        let script = resolved.invocation.program.clone();

        assert!(resolved.is_remote());
        assert_eq!(resolved.invocation.args, args(&["one"]));
        assert_eq!(fs::read_to_string(&script).unwrap(), "#!/bin/sh\necho remote\n");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&script).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
        assert_eq!(
            fetcher.requested.lock().unwrap().as_slice(),
            ["https://example.com/hello.sh".to_string()]
        );

        drop(resolved);
        assert!(!script.exists());
    }

    #[test]
    fn test_remote_non_200_is_error() {
        let resolver = Resolver::new(StubFetch::new(404, "not found"));
        let err = resolver
            .resolve("https://example.com/missing.sh", Vec::new(), None)
            .unwrap_err();
        assert!(matches!(err, LumenError::FetchStatus(404)));
    }
}
