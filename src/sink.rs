use crate::{
    errors::{FileOperation, IoError},
    stream::Destination,
    transactions::{Active, RollbackOperation, Transaction},
};
use miette::Diagnostic;
use std::{
    fs::{File, OpenOptions},
    io::{self, Seek, SeekFrom, Write},
};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum SinkError {
    #[error("unable to open output destination")]
    #[diagnostic(code(cfgenerator::sink::open))]
    Open(#[from] IoError),

    #[error("unable to write rendered output to: {}", .destinations.join(", "))]
    #[diagnostic(
        code(cfgenerator::sink::write),
        help("Every other destination received the full output")
    )]
    Write { destinations: Vec<String> },
}

enum Handle {
    Stdout,
    File(File),
}

/// A set of opened output destinations, in the order they were given.
pub struct Sinks {
    handles: Vec<(Destination, Handle)>,
}
impl Sinks {
    /// Opens every destination without truncating it.
    ///
    /// If any destination fails to open, files that this call created are removed and
    /// pre-existing files are left as they were.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Open`] naming the first destination that could not be opened.
    pub fn open(destinations: &[Destination]) -> Result<Self, SinkError> {
        let mut trx = Transaction::<Active>::new();
        let mut handles = Vec::with_capacity(destinations.len());

        for destination in destinations {
            let handle = match destination {
                Destination::Stdout => Handle::Stdout,
                Destination::File(path) => {
                    let existed = path.exists();

                    let file = OpenOptions::new()
                        .write(true)
                        .create(true)
                        .truncate(false)
                        .open(path)
                        .map_err(|error| IoError::new(FileOperation::Open, path.clone(), error))?;

                    if !existed {
                        trx.add_operation(RollbackOperation::RemoveFile(path.clone()));
                    }

                    Handle::File(file)
                }
            };

            log::debug!("Opened output: {}", destination);

            handles.push((destination.clone(), handle));
        }

        trx.commit();

        Ok(Self { handles })
    }

    /// Writes `content` to every destination in order.
    ///
    /// A failing destination does not stop the remaining ones from being written.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Write`] listing every destination that failed.
    pub fn fanout(self, content: &str) -> Result<(), SinkError> {
        let mut failed = Vec::new();

        for (destination, mut handle) in self.handles {
            match write_all(&mut handle, content.as_bytes()) {
                Ok(()) => log::debug!("Wrote {} bytes to {}", content.len(), destination),
                Err(error) => {
                    log::error!("unable to write to {}: {}", destination, error);
                    failed.push(destination.to_string());
                }
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(SinkError::Write {
                destinations: failed,
            })
        }
    }
}

fn write_all(handle: &mut Handle, bytes: &[u8]) -> io::Result<()> {
    match handle {
        Handle::Stdout => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()
        }
        Handle::File(file) => {
            // devices and pipes can be neither truncated nor rewound
            if file.metadata()?.is_file() {
                file.set_len(0)?;
                file.seek(SeekFrom::Start(0))?;
            }
            file.write_all(bytes)?;
            file.flush()
        }
    }
}
