use process_model_conversion::conversion::{NetToDiagramConfig, SubprocessConfig};
use process_model_conversion::{group_into_subprocesses, net_to_activity_diagram, PetriNet};
use std::env;
use std::error::Error;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <input_petri_net_json> <output_diagram_json>", args[0]);
        std::process::exit(1);
    }

    let input_path = PathBuf::from(&args[1]);
    let output_path = PathBuf::from(&args[2]);

    println!("Importing Petri net from {:?}", input_path);
    let mut net: PetriNet = serde_json::from_str(&std::fs::read_to_string(&input_path)?)?;

    println!("Translating to activity diagram...");
    let mut result = net_to_activity_diagram(&mut net, &NetToDiagramConfig::default())?;
    for warning in &result.warnings {
        println!("  Warning: {}", warning);
    }

    println!("Grouping into subprocesses...");
    let grouping = group_into_subprocesses(&mut result.model, &SubprocessConfig::default())?;

    println!("Activity diagram stats:");
    println!("  Nodes: {}", result.model.graph.node_count());
    println!("  Flows: {}", result.model.graph.edge_count());
    println!("  Subprocesses: {}", grouping.mapping.len());

    println!("Exporting activity diagram to {:?}", output_path);
    std::fs::write(&output_path, result.model.to_json()?)?;

    println!("Done!");
    Ok(())
}
