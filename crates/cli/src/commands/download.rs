//! download command - Stream an object into a local file

use std::path::{Path, PathBuf};

use clap::Args;
use indicatif::ProgressBar;
use sel_core::ObjectReader;
use serde::Serialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use super::{Context, container_and_item, fail, not_enough};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

const USAGE: &str = "selctl download [container] <object> [--path dest]";
const CHUNK_SIZE: usize = 64 * 1024;

/// Download an object to a file
#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// `[container] <object>`; the container defaults to --container
    #[arg(num_args = 1..=2, required = true)]
    pub args: Vec<String>,

    /// Destination path; defaults to the last component of the object name
    #[arg(short, long)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct DownloadOutput {
    status: &'static str,
    container: String,
    object: String,
    path: String,
    size_bytes: u64,
}

/// Execute the download command
pub async fn execute(args: DownloadArgs, ctx: Context, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let Some((container, name)) = container_and_item(&args.args, ctx.default_container()) else {
        return not_enough(&formatter, USAGE);
    };
    let Some(dest) = args.path.or_else(|| default_dest(&name)) else {
        return not_enough(&formatter, USAGE);
    };

    let client = match ctx.connect(&formatter).await {
        Ok(c) => c,
        Err(code) => return code,
    };
    let object = client.object(&container, &name);

    // Size only drives the progress bar
    let total = object.info().await.ok().map(|info| info.size);

    let reader = match object.get_reader().await {
        Ok(r) => r,
        Err(e) => {
            return fail(
                &formatter,
                &format!("Failed to download '{container}/{name}'"),
                &e,
            );
        }
    };

    let pb = formatter.progress(total, &format!("{name} -> {}", dest.display()));
    let written = match copy_to_file(reader, &dest, pb.as_ref()).await {
        Ok(n) => n,
        Err(e) => {
            if let Some(pb) = &pb {
                pb.abandon();
            }
            formatter.error(&format!("Failed to write '{}': {e}", dest.display()));
            return ExitCode::GeneralError;
        }
    };
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    if formatter.is_json() {
        formatter.json(&DownloadOutput {
            status: "success",
            container,
            object: name,
            path: dest.display().to_string(),
            size_bytes: written,
        });
    } else {
        formatter.success(&format!(
            "Downloaded {} to {} ({})",
            formatter.style_name(&name),
            dest.display(),
            formatter.style_size(&humansize::format_size(written, humansize::BINARY)),
        ));
    }

    ExitCode::Success
}

/// Local file name for an object: its last path component, so names with
/// `/` or `..` stay in the working directory
fn default_dest(name: &str) -> Option<PathBuf> {
    Path::new(name).file_name().map(PathBuf::from)
}

/// Copy everything from `reader` into a new file at `dest`.
/// A partially written file is removed on failure.
async fn copy_to_file(
    reader: ObjectReader,
    dest: &Path,
    pb: Option<&ProgressBar>,
) -> std::io::Result<u64> {
    let file = tokio::fs::File::create(dest).await?;
    match write_file(reader, file, pb).await {
        Ok(written) => Ok(written),
        Err(e) => {
            if let Err(remove) = tokio::fs::remove_file(dest).await {
                tracing::debug!(path = %dest.display(), error = %remove, "Could not remove partial file");
            }
            Err(e)
        }
    }
}

async fn write_file(
    mut reader: ObjectReader,
    mut file: tokio::fs::File,
    pb: Option<&ProgressBar>,
) -> std::io::Result<u64> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut written = 0u64;

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n]).await?;
        written += n as u64;
        if let Some(pb) = pb {
            pb.inc(n as u64);
        }
    }

    file.flush().await?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::task::{Context as TaskContext, Poll};
    use tokio::io::{AsyncRead, ReadBuf};

    /// Reader whose connection drops after the buffered prefix
    struct Broken;

    impl AsyncRead for Broken {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut TaskContext<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            Poll::Ready(Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset",
            )))
        }
    }

    #[test]
    fn test_default_dest_strips_directories() {
        assert_eq!(default_dest("cat.jpg"), Some(PathBuf::from("cat.jpg")));
        assert_eq!(default_dest("a/b/cat.jpg"), Some(PathBuf::from("cat.jpg")));
        assert_eq!(default_dest("../../etc/passwd"), Some(PathBuf::from("passwd")));
        assert_eq!(default_dest("/abs/cat.jpg"), Some(PathBuf::from("cat.jpg")));
        assert_eq!(default_dest(".."), None);
        assert_eq!(default_dest("dir/.."), None);
    }

    #[tokio::test]
    async fn test_failed_copy_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bin");
        let reader: ObjectReader =
            Box::new(std::io::Cursor::new(vec![1u8; CHUNK_SIZE + 3]).chain(Broken));

        let err = copy_to_file(reader, &dest, None).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::ConnectionReset);
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_copy_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bin");
        let data = vec![7u8; CHUNK_SIZE * 2 + 5];
        let reader: ObjectReader = Box::new(std::io::Cursor::new(data.clone()));

        let written = copy_to_file(reader, &dest, None).await.unwrap();
        assert_eq!(written, data.len() as u64);
        assert_eq!(std::fs::read(&dest).unwrap(), data);
    }

    #[tokio::test]
    async fn test_copy_to_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("missing").join("out.bin");
        let reader: ObjectReader = Box::new(std::io::Cursor::new(b"x".to_vec()));

        let err = copy_to_file(reader, &dest, None).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
