// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `portal`: drive the Google sign-in flow from a terminal.
//!
//! Each invocation is one "page load". `sign-in` starts the redirect and
//! prints the provider URL; `callback` finishes it with the URL the browser
//! landed on. State between the two lives in the tab-storage file.

mod app;
mod logging;
mod output;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use portal_auth_core::{is_callback, OAuthError};
use portal_auth_oauth::SignInConfig;
use portal_common_config::{load_config, load_config_with_file, PortalConfig};
use tracing::debug;
use url::Url;

use crate::app::Portal;
use crate::output::Output;

#[derive(Parser, Debug)]
#[command(name = "portal", version, about, long_about = None)]
struct Args {
	/// Path to custom configuration file
	#[arg(short, long, global = true)]
	config: Option<PathBuf>,

	/// Application origin used to build redirect URLs
	#[arg(long, env = "PORTAL_ORIGIN", global = true, default_value = "http://localhost:5173/")]
	origin: Url,

	/// Print machine-readable JSON
	#[arg(long, global = true)]
	json: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Start a Google sign-in, or finish one if --url is a callback
	SignIn {
		/// Current page URL (defaults to the origin)
		#[arg(long)]
		url: Option<Url>,
		/// Where the provider sends the user after success
		#[arg(long)]
		success_url: Option<Url>,
		/// Where the provider sends the user after failure
		#[arg(long)]
		failure_url: Option<Url>,
	},
	/// Finish a sign-in from the URL the browser returned to
	Callback {
		#[arg(long)]
		url: Url,
	},
	/// Report whether a URL is an OAuth callback
	IsCallback {
		#[arg(long)]
		url: Url,
	},
	/// End the current session
	SignOut,
	/// Show who is signed in
	Status,
	/// Show the pending sign-in, if any
	State,
	/// Change your display name
	Rename {
		#[arg(long)]
		name: String,
	},
}

fn load(args: &Args) -> Result<PortalConfig> {
	let config = match &args.config {
		Some(path) => load_config_with_file(path.clone()),
		None => load_config(),
	};
	config.context("failed to load configuration")
}

/// Prints the user-facing error. The returned error carries only the code.
fn failed(out: Output, what: &str, err: &OAuthError) -> anyhow::Error {
	out.error(err);
	anyhow!("{what} failed ({})", err.code)
}

#[tokio::main]
async fn main() -> Result<()> {
	let args = Args::parse();
	let out = Output { json: args.json };

	if let Command::IsCallback { url } = &args.command {
		out.flag(is_callback(url));
		return Ok(());
	}

	let config = load(&args)?;
	logging::init_tracing(&config.logging);
	debug!(origin = %args.origin, "portal starting");

	match args.command {
		Command::IsCallback { url } => out.flag(is_callback(&url)),
		Command::State => {
			let pending = app::state_store(&config).load().await;
			out.pending(pending.as_ref());
		}
		Command::SignIn {
			url,
			success_url,
			failure_url,
		} => {
			let portal = Portal::build(&config, url.unwrap_or_else(|| args.origin.clone()))?;
			let mut sign_in = SignInConfig::new();
			if let Some(url) = success_url {
				sign_in = sign_in.success_url(url);
			}
			if let Some(url) = failure_url {
				sign_in = sign_in.failure_url(url);
			}

			match portal.orchestrator.sign_in(sign_in).await {
				Ok(outcome) => out.sign_in(&outcome, portal.navigator.take().as_ref()),
				Err(err) => return Err(failed(out, "sign-in", &err)),
			}
		}
		Command::Callback { url } => {
			let portal = Portal::build(&config, url)?;
			match portal.orchestrator.handle_callback().await {
				Ok(outcome) => out.sign_in(&portal_auth_oauth::SignInOutcome::SignedIn(outcome), None),
				Err(err) => return Err(failed(out, "callback", &err)),
			}
		}
		Command::SignOut => {
			let portal = Portal::build(&config, args.origin.clone())?;
			if let Err(err) = portal.orchestrator.sign_out().await {
				return Err(failed(out, "sign-out", &err));
			}
			out.message("Signed out");
		}
		Command::Status => {
			let portal = Portal::build(&config, args.origin.clone())?;
			let status = portal.orchestrator.session_status().await;
			let display_name = match &status.identity {
				Some(identity) => Some(portal.profiles.display_name(identity).await),
				None => None,
			};
			out.status(&status, display_name.as_deref());
		}
		Command::Rename { name } => {
			let portal = Portal::build(&config, args.origin.clone())?;
			let identity = portal
				.orchestrator
				.session_status()
				.await
				.identity
				.context("not signed in")?;
			let record = portal
				.profiles
				.update_display_name(&identity.id, &name)
				.await
				.context("failed to update display name")?;
			out.message(&format!("Display name set to {}", record.name));
		}
	}

	Ok(())
}
