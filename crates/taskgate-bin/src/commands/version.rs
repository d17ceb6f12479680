// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `version` command.

use crate::cli::Cli;
use crate::error::BinResult;

/// Prints version information for every component.
pub fn version(_cli: &Cli) -> BinResult<()> {
    println!("taskgate - session and access control for the task backend");
    println!();
    println!("Version Information:");
    println!("  taskgate-bin:  {}", crate::VERSION);
    println!("  taskgate-core: {}", taskgate_core::VERSION);
    println!("  taskgate-api:  {}", taskgate_api::VERSION);
    println!();
    println!("Build Information:");
    println!("  Rust Edition: 2024");
    println!("  Target:       {}", std::env::consts::ARCH);
    println!("  OS:           {}", std::env::consts::OS);
    println!();
    println!("Security:");
    println!("  Tokens:       HS256 JWT");
    println!("  Passwords:    Argon2id");
    println!();
    println!("License: PolyForm Noncommercial License 1.0.0");
    println!("Copyright (c) 2025 Sylvex. All rights reserved.");

    Ok(())
}
