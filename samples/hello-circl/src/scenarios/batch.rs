use circl_cve_client::{Context, ServiceClient};

pub async fn run(client: &ServiceClient, ctx: &Context) -> Result<(), String> {
    println!("Scenario: batch");

    let cweids = ["CWE-15", "CWE-20", "CWE-200", "CWE-9999"];
    let results = client
        .get_cwes(ctx, &cweids)
        .await
        .map_err(|e| e.to_string())?;

    let mut keys = results.keys().cloned().collect::<Vec<String>>();
    keys.sort();
    for key in keys {
        match results.get(&key) {
            Some(Ok(record)) => println!("{}: {}", key, record),
            Some(Err(e)) => println!("{}: {}", key, e),
            None => {}
        }
    }

    Ok(())
}
