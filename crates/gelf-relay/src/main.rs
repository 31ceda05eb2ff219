// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use tokio::time::{interval, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use gelf_udp::config::RelayConfig;
use gelf_udp::listener::{GelfListener, ListenerConfig};
use gelf_udp::record_service::RecordService;

mod logger;

const FLUSH_INTERVAL_SECONDS: u64 = 5;

#[tokio::main]
pub async fn main() {
    let config = match RelayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid GELF relay configuration: {e}");
            return;
        }
    };

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(&config.log_level)
                .expect("could not parse log level in configuration"),
        )
        .event_format(logger::Formatter)
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    debug!("Logging subsystem enabled");

    let (record_service, record_handle) = RecordService::new();
    tokio::spawn(record_service.run());

    let listener_config = ListenerConfig {
        host: config.bind_host.clone(),
        port: config.port,
    };
    let cancel_token = CancellationToken::new();
    let listener = match GelfListener::new(
        &listener_config,
        record_handle.clone(),
        cancel_token.clone(),
    )
    .await
    {
        Ok(listener) => listener,
        Err(e) => {
            error!("Error starting GELF listener: {e}");
            return;
        }
    };

    tokio::spawn(async move {
        listener.spin().await;
    });
    info!(
        "gelf-udp: starting to listen on {}:{}",
        config.bind_host, config.port
    );

    let mut flush_interval = interval(Duration::from_secs(FLUSH_INTERVAL_SECONDS));
    flush_interval.tick().await; // discard first tick, which is instantaneous

    loop {
        flush_interval.tick().await;

        debug!("Flushing decoded records");
        match record_handle.flush().await {
            Ok(records) => {
                for record in records {
                    match serde_json::to_string(&record) {
                        Ok(line) => println!("{line}"),
                        Err(e) => error!("Failed to serialize record: {e}"),
                    }
                }
            }
            Err(e) => error!("Failed to flush records: {e}"),
        }
    }
}
