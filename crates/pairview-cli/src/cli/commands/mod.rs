pub mod cache;
pub mod view;

use super::args::{Cli, Command};
use super::helpers::resolve_labels;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match &cli.cmd {
        Command::List(args) => view::cmd_list(args, resolve_labels(&cli)?).await,
        Command::Show(args) => view::cmd_show(args, resolve_labels(&cli)?).await,
        Command::Browse(args) => view::cmd_browse(args, resolve_labels(&cli)?).await,
        Command::Cache(args) => cache::cmd_cache(args).await,
    }
}
