use std::fs::File;
use std::io::{BufRead, BufReader};
use std::os::unix::io::{FromRawFd, OwnedFd, RawFd};
use std::path::{Path, PathBuf};
use std::thread;

use log::{debug, info};
use nix::unistd::{access, AccessFlags};

use spawndir::capabilities::native_chdir_spawn_supported;
use spawndir::{
    launch, native_spawn, wait_child, ExitStatus, FileActions, LaunchConfig, PipePair,
};

/// Configuration for one run
pub struct RunConfig {
    pub dir: PathBuf,
    pub program: String,
    pub args: Vec<String>,
    pub merge_stderr: bool,
    pub no_redirect: bool,
    pub force_fallback: bool,
}

pub fn run(config: RunConfig) -> Result<i32, Box<dyn std::error::Error>> {
    let program = resolve_program(&config.program)?;
    debug!("resolved program: {}", program);

    let env: Vec<(String, String)> = std::env::vars().collect();
    let mut argv = vec![config.program.clone()];
    argv.extend(config.args.iter().cloned());

    let stdin_pipe = PipePair::new()?;
    let stdout_pipe = PipePair::new()?;
    let stderr_pipe = PipePair::new()?;

    // Readers drain the pipes while the child runs, so a chatty child never
    // fills a pipe buffer against a blocked parent. They hold dup'd read
    // ends and reach EOF once the child is gone and the parent ends drop.
    let mut readers = Vec::new();
    if !config.no_redirect {
        readers.push(spawn_line_reader(dup_owned(stdout_pipe.read_fd())?, false));
        if !config.merge_stderr {
            readers.push(spawn_line_reader(dup_owned(stderr_pipe.read_fd())?, true));
        }
    }

    let use_native = !config.force_fallback && native_chdir_spawn_supported();

    let status = if use_native {
        debug!("using the native posix_spawn path");
        let mut actions = FileActions::new()?;
        actions.add_chdir(&config.dir)?;
        actions.add_dup2(stdin_pipe.read_fd(), 0)?;
        actions.add_close(stdin_pipe.read_fd())?;
        actions.add_close(stdin_pipe.write_fd())?;
        if !config.no_redirect {
            actions.add_dup2(stdout_pipe.write_fd(), 1)?;
            actions.add_close(stdout_pipe.read_fd())?;
            actions.add_close(stdout_pipe.write_fd())?;
            if config.merge_stderr {
                actions.add_dup2(1, 2)?;
            } else {
                actions.add_dup2(stderr_pipe.write_fd(), 2)?;
                actions.add_close(stderr_pipe.read_fd())?;
                actions.add_close(stderr_pipe.write_fd())?;
            }
        }

        let pid = native_spawn(Path::new(&program), &argv, &env, &actions)?;
        info!("spawned child {} via posix_spawn", pid);
        wait_child(pid)?
    } else {
        debug!("using the fork/exec fallback");
        let launch_config = LaunchConfig {
            dir: config.dir.clone(),
            program: PathBuf::from(&program),
            args: argv,
            env,
            redirect_output: !config.no_redirect,
            merge_stderr: config.merge_stderr,
        };
        launch(&launch_config, &stdin_pipe, &stdout_pipe, &stderr_pipe)?.status
    };

    // Parent-side ends close here so the readers can reach EOF.
    drop(stdin_pipe);
    drop(stdout_pipe);
    drop(stderr_pipe);

    for handle in readers {
        let _ = handle.join();
    }

    match status {
        ExitStatus::Exited(code) => {
            info!("child exited with code {}", code);
            Ok(code)
        }
        ExitStatus::Signaled(signal) => {
            info!("child killed by signal {}", signal);
            Ok(128 + signal)
        }
    }
}

/// Resolve a program name to a path using PATH semantics.
fn resolve_program(program: &str) -> Result<String, Box<dyn std::error::Error>> {
    if program.contains('/') {
        return Ok(program.to_string());
    }

    const DEFAULT_PATH: &str = "/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin";
    let path_value = std::env::var("PATH").unwrap_or_else(|_| DEFAULT_PATH.to_string());

    for entry in path_value.split(':') {
        let dir = if entry.is_empty() { "." } else { entry };
        let candidate = Path::new(dir).join(program);

        if access(&candidate, AccessFlags::X_OK).is_ok() {
            return Ok(candidate.to_string_lossy().into_owned());
        }
    }

    Err(format!("command not found: {}", program).into())
}

/// Spawn a reader thread that forwards pipe lines to our own streams.
fn spawn_line_reader(fd: OwnedFd, to_stderr: bool) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let reader = BufReader::new(File::from(fd));
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    if to_stderr {
                        eprintln!("{}", line);
                    } else {
                        println!("{}", line);
                    }
                }
                Err(_) => continue,
            }
        }
    })
}

/// Duplicate a read end for a reader thread to own.
fn dup_owned(fd: RawFd) -> Result<OwnedFd, Box<dyn std::error::Error>> {
    let duped = nix::unistd::dup(fd)?;
    // SAFETY: dup just handed us a fresh descriptor nobody else owns.
    Ok(unsafe { OwnedFd::from_raw_fd(duped) })
}
