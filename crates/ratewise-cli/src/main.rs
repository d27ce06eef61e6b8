mod command;
mod dataset;
mod report;
mod util;

fn main() -> anyhow::Result<()> {
    command::run()
}
