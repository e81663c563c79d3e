use pac_router::config::{Config, LoggingConfig};
use pac_router::engine::RoutingMethod;
use pac_router::init::init_memory_sink;
use pac_router::logger::{DecisionLogEntry, DecisionLogger};

#[tokio::test]
async fn test_logging_config_instantiation() {
    let config = LoggingConfig {
        level: "info".to_string(),
        format: "json".to_string(),
        log_decisions: true,
        decision_log_sinks: vec!["console".to_string(), "memory".to_string()],
        memory_capacity: 10,
    };

    let app_config = Config {
        logging: config.clone(),
        ..Config::default()
    };
    let (extra_sinks, buffer) = init_memory_sink(&app_config);
    let buffer = buffer.expect("memory sink configured");

    let logger = DecisionLogger::new(config, extra_sinks);

    for host in ["test.com", "alkasir.com"] {
        logger.log(DecisionLogEntry {
            client_ip: "1.2.3.4".to_string(),
            host: host.to_string(),
            url: Some(format!("https://{host}/")),
            method: RoutingMethod::Default,
            transport: "DIRECT".to_string(),
            generation: 1,
            latency_us: 0,
        });
    }

    // Allow time for async task to process
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

    let hosts: Vec<String> = buffer
        .read()
        .unwrap()
        .iter()
        .map(|e| e.host.clone())
        .collect();
    assert_eq!(hosts, vec!["test.com", "alkasir.com"]);
}
