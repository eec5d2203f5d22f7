use clap::Parser;

use rubric_search_app::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = Args::parse();

	rubric_search_app::run(args).await
}
