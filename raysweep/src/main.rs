fn main() -> anyhow::Result<()> {
    raysweep::run()
}
