use comfy_table::Table;
use selora_deploy::DeploymentOutcome;

/// Render the recorded addresses of a finished flow as a table.
pub fn render(outcome: &DeploymentOutcome) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Entry", "Value"]);

    table.add_row(vec!["Network".to_string(), outcome.network.name.clone()]);
    table.add_row(vec![
        "Chain ID".to_string(),
        outcome.network.chain_id.to_string(),
    ]);
    for (index, router) in outcome.state.routers.iter().enumerate() {
        table.add_row(vec![format!("Router #{index}"), router.to_string()]);
    }
    table.add_row(vec![
        "Swap executor".to_string(),
        outcome.state.swap_executor.to_string(),
    ]);
    table.add_row(vec![
        "State file".to_string(),
        outcome.path.display().to_string(),
    ]);

    table
}
