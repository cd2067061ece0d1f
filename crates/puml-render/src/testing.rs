//! Test doubles for the toolchain and HTTP seams.

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::RenderError;
use crate::local::{Toolchain, ToolchainOutput};
use crate::remote::Fetch;

/// What a [`FakeToolchain`] does when run.
#[derive(Debug, Clone)]
pub(crate) enum ToolchainBehavior {
    /// Write the given artifact and exit 0.
    Write(String),
    /// Exit with the given code and stderr, writing nothing.
    Exit(i32, String),
    /// Write the given artifact, then report the given stderr with exit 0.
    WriteWithStderr(String, String),
    /// Exit 0 without writing anything.
    Silent,
}

#[derive(Debug, Default)]
struct Invocations {
    calls: usize,
    last: Option<(PathBuf, Vec<OsString>)>,
}

/// [`Toolchain`] mimicking `PlantUML`: writes `{input}.{format}` next to the input.
///
/// Clones share their invocation log.
#[derive(Debug, Clone)]
pub(crate) struct FakeToolchain {
    behavior: ToolchainBehavior,
    invocations: Arc<Mutex<Invocations>>,
}

impl FakeToolchain {
    pub(crate) fn new(behavior: ToolchainBehavior) -> Self {
        Self {
            behavior,
            invocations: Arc::default(),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.invocations.lock().unwrap().calls
    }

    pub(crate) fn last_invocation(&self) -> Option<(PathBuf, Vec<OsString>)> {
        self.invocations.lock().unwrap().last.clone()
    }
}

/// Output path `PlantUML` would write for `args`.
fn output_path(args: &[OsString]) -> PathBuf {
    let format = args
        .iter()
        .filter_map(|arg| arg.to_str())
        .find_map(|arg| arg.strip_prefix("-t"))
        .unwrap();
    let mut path = args.last().unwrap().clone();
    path.push(".");
    path.push(format);
    PathBuf::from(path)
}

impl Toolchain for FakeToolchain {
    fn run(&self, program: &Path, args: &[OsString]) -> std::io::Result<ToolchainOutput> {
        {
            let mut invocations = self.invocations.lock().unwrap();
            invocations.calls += 1;
            invocations.last = Some((program.to_path_buf(), args.to_vec()));
        }

        let output = match &self.behavior {
            ToolchainBehavior::Write(content) => {
                std::fs::write(output_path(args), content)?;
                ToolchainOutput {
                    success: true,
                    code: Some(0),
                    ..ToolchainOutput::default()
                }
            }
            ToolchainBehavior::Exit(code, stderr) => ToolchainOutput {
                success: false,
                code: Some(*code),
                stderr: stderr.clone(),
                ..ToolchainOutput::default()
            },
            ToolchainBehavior::WriteWithStderr(content, stderr) => {
                std::fs::write(output_path(args), content)?;
                ToolchainOutput {
                    success: true,
                    code: Some(0),
                    stderr: stderr.clone(),
                    ..ToolchainOutput::default()
                }
            }
            ToolchainBehavior::Silent => ToolchainOutput {
                success: true,
                code: Some(0),
                ..ToolchainOutput::default()
            },
        };
        Ok(output)
    }
}

#[derive(Debug, Default)]
struct Requests {
    calls: usize,
    last_url: Option<String>,
}

/// [`Fetch`] returning a canned body or error. Clones share their request log.
#[derive(Debug, Clone)]
pub(crate) struct FakeFetcher {
    response: Result<Vec<u8>, String>,
    requests: Arc<Mutex<Requests>>,
}

impl FakeFetcher {
    pub(crate) fn ok(body: &[u8]) -> Self {
        Self {
            response: Ok(body.to_vec()),
            requests: Arc::default(),
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_owned()),
            requests: Arc::default(),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap().calls
    }

    pub(crate) fn last_url(&self) -> Option<String> {
        self.requests.lock().unwrap().last_url.clone()
    }

    fn respond(&self, url: &str) -> Result<Vec<u8>, RenderError> {
        let mut requests = self.requests.lock().unwrap();
        requests.calls += 1;
        requests.last_url = Some(url.to_owned());
        self.response.clone().map_err(RenderError::Http)
    }
}

impl Fetch for FakeFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, RenderError> {
        self.respond(url)
    }

    fn fetch_to(&self, url: &str, writer: &mut dyn Write) -> Result<u64, RenderError> {
        let body = self.respond(url)?;
        writer.write_all(&body)?;
        Ok(body.len() as u64)
    }
}
