fn main() -> anyhow::Result<()> {
    thedas::cli::run_cli()
}
