// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use std::path::Path;

use serde::Serialize;

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::config::TaskgateConfig;
use crate::error::{BinError, BinResult};
use crate::loader::ConfigLoader;

/// Outcome of a successful validation.
#[derive(Debug, Serialize)]
pub struct ValidationReport<'a> {
    valid: bool,
    config_path: String,
    summary: Summary,
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<&'a TaskgateConfig>,
}

#[derive(Debug, Serialize)]
struct Summary {
    listen: String,
    jwt_issuer: String,
    token_ttl_secs: u64,
    revocation_ttl_secs: u64,
    seed_accounts: usize,
}

impl<'a> ValidationReport<'a> {
    /// Builds a report for a loaded configuration.
    pub fn new(path: &Path, config: &'a TaskgateConfig, show_config: bool) -> Self {
        Self {
            valid: true,
            config_path: path.display().to_string(),
            summary: Summary {
                listen: config.api.socket_addr().to_string(),
                jwt_issuer: config.api.jwt.issuer.clone(),
                token_ttl_secs: config.api.jwt.expiration_secs,
                revocation_ttl_secs: config.api.session.revocation_ttl_secs,
                seed_accounts: config.seed_accounts.len(),
            },
            warnings: config.warnings(),
            config: show_config.then_some(config),
        }
    }

    /// Returns the warnings found.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Renders the report in the requested format.
    pub fn render(&self, format: OutputFormat) -> BinResult<String> {
        match format {
            OutputFormat::Text => Ok(self.render_text()),
            OutputFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|e| BinError::command(format!("Failed to render report: {}", e))),
            OutputFormat::Yaml => serde_yaml::to_string(self)
                .map_err(|e| BinError::command(format!("Failed to render report: {}", e))),
        }
    }

    fn render_text(&self) -> String {
        let mut out = format!("✓ Configuration is valid: {}\n\n", self.config_path);
        out.push_str("Summary:\n");
        out.push_str(&format!("  Listen:          {}\n", self.summary.listen));
        out.push_str(&format!("  JWT issuer:      {}\n", self.summary.jwt_issuer));
        out.push_str(&format!("  Token TTL:       {}s\n", self.summary.token_ttl_secs));
        out.push_str(&format!(
            "  Revocation TTL:  {}s\n",
            self.summary.revocation_ttl_secs
        ));
        out.push_str(&format!("  Seed accounts:   {}\n", self.summary.seed_accounts));

        if !self.warnings.is_empty() {
            out.push_str("\nWarnings:\n");
            for warning in &self.warnings {
                out.push_str(&format!("  ⚠ {}\n", warning));
            }
        }

        if let Some(config) = self.config {
            out.push_str("\nParsed configuration:\n");
            out.push_str(
                &serde_yaml::to_string(config)
                    .unwrap_or_else(|_| "(serialization error)".to_string()),
            );
        }

        out
    }
}

/// Loads and validates the configuration file.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = &cli.config;

    let config = ConfigLoader::new().load(config_path).map_err(|e| {
        BinError::from(e).with_context("Configuration validation failed")
    })?;

    let report = ValidationReport::new(config_path, &config, args.show_config);
    println!("{}", report.render(args.format)?);

    if args.strict && !report.warnings().is_empty() {
        return Err(BinError::config(format!(
            "Strict mode: {} warning(s) found",
            report.warnings().len()
        )));
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
