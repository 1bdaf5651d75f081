//! list command - List containers in the account or objects in a container

use clap::{Args, ValueEnum};
use sel_core::{ContainerInfo, ObjectInfo};
use serde::Serialize;

use super::{Context, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListType {
    Storage,
    Container,
}

/// List containers, or objects in a container
#[derive(Args, Debug)]
pub struct ListArgs {
    /// List containers (storage) or objects (container)
    #[arg(short = 't', long = "type", value_enum, default_value_t = ListType::Storage)]
    pub kind: ListType,

    /// Container to list; defaults to --container
    pub container: Option<String>,
}

#[derive(Serialize)]
struct ContainerListOutput<'a> {
    containers: &'a [ContainerInfo],
}

#[derive(Serialize)]
struct ObjectListOutput<'a> {
    container: &'a str,
    objects: &'a [ObjectInfo],
}

#[derive(Debug, PartialEq, Eq)]
enum Target {
    Containers,
    Objects(String),
}

/// An explicit container always lists its objects. Otherwise the default
/// container is only used with `--type container`.
fn resolve(kind: ListType, container: Option<&str>, default: Option<&str>) -> Target {
    match (kind, container, default) {
        (_, Some(c), _) => Target::Objects(c.to_string()),
        (ListType::Container, None, Some(d)) => Target::Objects(d.to_string()),
        (_, None, _) => Target::Containers,
    }
}

/// Execute the list command
pub async fn execute(args: ListArgs, ctx: Context, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let target = resolve(
        args.kind,
        args.container.as_deref().filter(|c| !c.is_empty()),
        ctx.default_container(),
    );

    let client = match ctx.connect(&formatter).await {
        Ok(c) => c,
        Err(code) => return code,
    };

    match target {
        Target::Containers => match client.containers_info().await {
            Ok(containers) => print_containers(&formatter, &containers),
            Err(e) => return fail(&formatter, "Failed to list containers", &e),
        },
        Target::Objects(container) => match client.container(&container).objects_info().await {
            Ok(objects) => print_objects(&formatter, &container, &objects),
            Err(e) => {
                return fail(
                    &formatter,
                    &format!("Failed to list container '{container}'"),
                    &e,
                );
            }
        },
    }

    ExitCode::Success
}

fn print_containers(formatter: &Formatter, containers: &[ContainerInfo]) {
    if formatter.is_json() {
        formatter.json(&ContainerListOutput { containers });
        return;
    }

    let mut table = formatter.table(&["Name", "Objects", "Size", "Type"]);
    for c in containers {
        table.add_row(vec![
            c.name.clone(),
            c.object_count.to_string(),
            humansize::format_size(c.bytes_used, humansize::BINARY),
            c.container_type.to_string(),
        ]);
    }
    formatter.print_table(&table);
}

fn print_objects(formatter: &Formatter, container: &str, objects: &[ObjectInfo]) {
    if formatter.is_json() {
        formatter.json(&ObjectListOutput { container, objects });
        return;
    }

    let mut table = formatter.table(&["Name", "Size", "Downloaded", "Modified"]);
    for o in objects {
        table.add_row(vec![
            o.name.clone(),
            humansize::format_size(o.size, humansize::BINARY),
            o.downloaded.to_string(),
            o.last_modified.strftime("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }
    formatter.print_table(&table);
}
