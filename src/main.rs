fn main() -> anyhow::Result<()> {
    physique_eval::run()
}
