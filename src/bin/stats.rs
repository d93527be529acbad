use arbgraph::{build_graph, Config, Snapshot};
use std::collections::BTreeMap;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "warn")).init();

    let config = Config::load()?;
    let snapshot = Snapshot::load_dir(config.data_dir())?;

    let start = Instant::now();
    let graph = build_graph(&snapshot);
    let duration = start.elapsed();

    let mut kinds: BTreeMap<&str, usize> = BTreeMap::new();
    for node in graph.nodes() {
        *kinds.entry(node.kind.as_str()).or_default() += 1;
    }

    println!("\n╔══════════════════════════════════════════════════════════════════════════════╗");
    println!("║ Arbgraph Snapshot Statistics                                                 ║");
    println!("╚══════════════════════════════════════════════════════════════════════════════╝");
    println!("Snapshot:    {}", config.data_dir().display());
    println!("Cases:       {}", snapshot.cases.len());
    println!("Decisions:   {}", snapshot.decisions.len());
    println!("Individuals: {}", snapshot.individuals.len());
    println!("Parties:     {}", snapshot.parties.len());

    println!("\nNodes: {}", graph.nodes().len());
    for (kind, count) in &kinds {
        println!("  {:<20} {}", kind, count);
    }
    println!("Edges: {}", graph.edges().len());
    println!("Connected components: {}", graph.component_count());
    println!("Dangling references: {}", graph.stats().dangling_refs);
    println!("Repeated ids skipped: {}", graph.stats().self_pairs);
    println!("\nBuild time: {:?}", duration);

    Ok(())
}
