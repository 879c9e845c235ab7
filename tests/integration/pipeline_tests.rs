//! End-to-end pipeline tests
//!
//! Drives the whole flow the `run` subcommand uses: execute a (fake) build
//! command, collect its outcome, then dispatch the obfuscation hook over
//! the outputs it wrote.

use super::common::*;
use anyhow::Result;
use serial_test::serial;
use std::sync::Arc;

use shroud::build::BuildRunner;
use shroud::config::BuildConfig;
use shroud::hooks::{HookContext, HookManager, ObfuscateHook};

fn build_config(command: &str) -> BuildConfig {
    BuildConfig {
        command: command.to_string(),
        metafile: "meta.json".to_string(),
        timeout_secs: 30,
    }
}

#[tokio::test]
#[serial]
async fn build_then_obfuscate() -> Result<()> {
    let env = TestEnvironment::new()?;

    // Stand-in bundler: writes one output and a metafile listing it
    let command = r#"mkdir -p dist \
        && echo 'function secret() { return 42; } secret();' > dist/app.js \
        && echo '{"outputs":{"dist/app.js":{"bytes":44}}}' > meta.json"#;

    let runner = BuildRunner::new(build_config(command), &env.project_path);
    let outcome = runner.run().await?;
    assert!(!outcome.failed());

    let manager = HookManager::new();
    manager
        .register(Arc::new(ObfuscateHook::new(
            Arc::new(RenameTransformer),
            serde_json::json!({"compact": true}),
        )))
        .await;

    let ctx = HookContext::new(&env.project_path);
    manager.run_build_end(&outcome, &ctx).await?;

    let content = std::fs::read_to_string(env.project_path.join("dist/app.js"))?;
    assert!(!content.contains("secret"));
    assert!(content.contains("function _0x"));

    Ok(())
}

#[tokio::test]
#[serial]
async fn failed_build_reaches_hooks_as_a_no_op() -> Result<()> {
    let env = TestEnvironment::new()?;
    let before = "function secret() {}\n";
    env.write_output("dist/app.js", before)?;

    let runner = BuildRunner::new(
        build_config("echo 'Could not resolve entry' >&2; exit 1"),
        &env.project_path,
    );
    let outcome = runner.run().await?;
    assert!(outcome.failed());

    let manager = HookManager::new();
    manager
        .register(Arc::new(ObfuscateHook::new(
            Arc::new(RenameTransformer),
            serde_json::json!({}),
        )))
        .await;

    let ctx = HookContext::new(&env.project_path);
    manager.run_build_end(&outcome, &ctx).await?;

    // The hook left the stale output from the previous build alone
    let after = std::fs::read_to_string(env.project_path.join("dist/app.js"))?;
    assert_eq!(after, before);

    Ok(())
}

#[tokio::test]
#[serial]
async fn build_without_metafile_leaves_outputs_alone() -> Result<()> {
    let env = TestEnvironment::new()?;
    let before = "function secret() {}\n";
    env.write_output("dist/app.js", before)?;

    // Build succeeds but never writes meta.json
    let runner = BuildRunner::new(build_config("true"), &env.project_path);
    let outcome = runner.run().await?;
    assert!(!outcome.failed());
    assert!(outcome.metafile.is_none());

    let manager = HookManager::new();
    manager
        .register(Arc::new(ObfuscateHook::new(
            Arc::new(RenameTransformer),
            serde_json::json!({}),
        )))
        .await;

    let ctx = HookContext::new(&env.project_path);
    manager.run_build_end(&outcome, &ctx).await?;

    let after = std::fs::read_to_string(env.project_path.join("dist/app.js"))?;
    assert_eq!(after, before);

    Ok(())
}
