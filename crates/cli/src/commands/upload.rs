//! upload command - Upload a local file into a container

use std::path::Path;

use clap::Args;
use serde::Serialize;

use super::{Context, container_and_item, fail, not_enough};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

const USAGE: &str = "selctl upload [container] <path>";

/// Upload a file; the object is named after the file
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// `[container] <path>`; the container defaults to --container
    #[arg(num_args = 1..=2, required = true)]
    pub args: Vec<String>,
}

#[derive(Debug, Serialize)]
struct UploadOutput {
    status: &'static str,
    container: String,
    object: String,
    size_bytes: u64,
    size_human: String,
}

/// Execute the upload command
pub async fn execute(args: UploadArgs, ctx: Context, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let Some((container, path)) = container_and_item(&args.args, ctx.default_container()) else {
        return not_enough(&formatter, USAGE);
    };
    let path = Path::new(&path);

    let client = match ctx.connect(&formatter).await {
        Ok(c) => c,
        Err(code) => return code,
    };

    let spinner = formatter.progress(None, &format!("Uploading {}", path.display()));
    let result = client.container(&container).upload_file(path).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    if let Err(e) = result {
        return fail(
            &formatter,
            &format!("Failed to upload '{}'", path.display()),
            &e,
        );
    }

    let object = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let size_bytes = std::fs::metadata(path).map(|m| m.len()).unwrap_or_default();

    if formatter.is_json() {
        formatter.json(&UploadOutput {
            status: "success",
            container,
            object,
            size_bytes,
            size_human: humansize::format_size(size_bytes, humansize::BINARY),
        });
    } else {
        formatter.success(&format!(
            "Uploaded {} to {} ({})",
            formatter.style_name(&object),
            formatter.style_name(&container),
            formatter.style_size(&humansize::format_size(size_bytes, humansize::BINARY)),
        ));
    }

    ExitCode::Success
}
