fn main() -> anyhow::Result<()> {
    xliffsync::cli::run_cli()
}
