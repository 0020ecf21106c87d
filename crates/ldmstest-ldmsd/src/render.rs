//! ldmsd configuration text and command lines.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use ldmstest_spec::{Mapping, SpecNode};

use crate::daemon::DaemonSpec;
use crate::error::{DaemonError, DaemonResult};
use crate::version::LdmsdVersion;

pub const DEFAULT_SAMPLER_INTERVAL: i64 = 2_000_000;
pub const DEFAULT_LISTEN_XPRT: &str = "sock";
pub const DEFAULT_LISTEN_PORT: i64 = 10000;

static SAMPLER_VAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%(\w+)%").expect("valid sampler variable regex"));

/// Render the `-c` configuration file of `daemon`.
///
/// Sections are emitted in a fixed order: `auth`, `listen`, `samplers`,
/// `prdcrs`, then the raw `config` lines.
pub fn render_config(daemon: &DaemonSpec, version: LdmsdVersion) -> DaemonResult<String> {
    let mut out = String::new();

    for auth in entries(daemon, "auth")? {
        let name = required(auth, "auth", "name")?;
        push_line(&mut out, &command_line_of("auth_add", Some(&name), auth, &["name"])?);
    }

    for listen in entries(daemon, "listen")? {
        push_line(&mut out, &command_line_of("listen", None, listen, &[])?);
    }

    for sampler in entries(daemon, "samplers")? {
        out.push_str(&render_sampler(sampler, version)?);
    }

    for prdcr in entries(daemon, "prdcrs")? {
        let name = required(prdcr, "prdcrs", "name")?;
        push_line(&mut out, &command_line_of("prdcr_add", Some(&name), prdcr, &["name"])?);
    }

    for line in daemon.section("config")? {
        let line = line
            .as_scalar()
            .ok_or_else(|| DaemonError::invalid_spec("config", "expected a list of lines"))?;
        push_line(&mut out, &line.to_string());
    }

    debug!(daemon = ?daemon.name(), %version, bytes = out.len(), "rendered ldmsd config");
    Ok(out)
}

/// `ldmsd [-x XPRT:PORT] [-a AUTH] -c CONFIG -l LOG -v LEVEL`.
pub fn command_line(daemon: &DaemonSpec) -> String {
    let mut args = vec!["ldmsd".to_string()];
    if let (Some(xprt), Some(port)) = (daemon.text("listen_xprt"), daemon.text("listen_port")) {
        args.push(format!("-x {xprt}:{port}"));
    }
    if let Some(auth) = daemon.text("listen_auth") {
        args.push(format!("-a {auth}"));
    }
    args.push(format!("-c {}", daemon.config_file()));
    args.push(format!("-l {}", daemon.log_file()));
    args.push(format!("-v {}", daemon.log_level()));
    args.join(" ")
}

/// `ldmsd_controller` invocation reaching `daemon` on `host`.
///
/// Uses the first `listen` entry, else the `listen_*` attributes.
pub fn controller_command(daemon: &DaemonSpec, host: &str) -> String {
    let listen = daemon
        .get("listen")
        .and_then(SpecNode::as_sequence)
        .and_then(|entries| entries.first())
        .and_then(SpecNode::as_mapping);
    let attr = |listen_key: &str, flat_key: &str| match listen {
        Some(map) => map.get(listen_key).and_then(SpecNode::as_scalar).map(ToString::to_string),
        None => daemon.text(flat_key),
    };

    let xprt = attr("xprt", "listen_xprt").unwrap_or_else(|| DEFAULT_LISTEN_XPRT.to_string());
    let port = attr("port", "listen_port").unwrap_or_else(|| DEFAULT_LISTEN_PORT.to_string());
    let auth = attr("auth", "listen_auth").unwrap_or_else(|| "none".to_string());
    format!("ldmsd_controller --host {host} --xprt {xprt} --port {port} --auth {auth}")
}

/// Controller input: one command per line.
pub fn controller_input<S: AsRef<str>>(commands: &[S]) -> String {
    commands.iter().fold(String::new(), |mut acc, cmd| {
        acc.push_str(cmd.as_ref());
        acc.push('\n');
        acc
    })
}

fn render_sampler(sampler: &Mapping, version: LdmsdVersion) -> DaemonResult<String> {
    let plugin = required(sampler, "samplers", "plugin")?;

    let mut config = vec!["config".to_string(), format!("name={plugin}")];
    if let Some(words) = sampler.get("config") {
        let path = format!("samplers.{plugin}.config");
        let words = words
            .as_sequence()
            .ok_or_else(|| DaemonError::invalid_spec(&path, "expected a list"))?;
        for word in words {
            let word = word
                .as_scalar()
                .ok_or_else(|| DaemonError::invalid_spec(&path, "expected scalars"))?;
            config.push(word.to_string());
        }
    }

    let mut lines = vec![format!("load name={plugin}"), config.join(" ")];

    if sampler.get("start").is_some_and(SpecNode::is_truthy) {
        let mut timing = Vec::new();
        let interval = match sampler.get("interval") {
            Some(value) => scalar_text(value),
            None => Some(DEFAULT_SAMPLER_INTERVAL.to_string()),
        };
        if let Some(interval) = interval.filter(|s| !s.is_empty()) {
            timing.push(format!("interval={interval}"));
        }
        if let Some(offset) = sampler.get("offset").and_then(scalar_text).filter(|s| !s.is_empty()) {
            timing.push(format!("offset={offset}"));
        }

        if version.is_v4() {
            lines.push(join_words(&[format!("start name={plugin}")], &timing));
        } else {
            lines.push(join_words(
                &[format!("smplr_add name={plugin}_smplr instance={plugin}")],
                &timing,
            ));
            lines.push(format!("smplr_start name={plugin}_smplr"));
        }
    }

    let mut block = lines.join("\n");
    block.push('\n');
    substitute_sampler_vars(&block, sampler, &plugin)
}

/// Replace `%word%` with the sampler's own attribute `word`.
fn substitute_sampler_vars(block: &str, sampler: &Mapping, plugin: &str) -> DaemonResult<String> {
    let mut missing = None;
    let replaced = SAMPLER_VAR_RE.replace_all(block, |caps: &Captures<'_>| {
        match sampler.get(&caps[1]).and_then(scalar_text) {
            Some(value) => value,
            None => {
                if missing.is_none() {
                    missing = Some(caps[1].to_string());
                }
                String::new()
            }
        }
    });
    match missing {
        Some(name) => Err(DaemonError::missing(format!("samplers.{plugin}"), name)),
        None => Ok(replaced.into_owned()),
    }
}

fn entries<'a>(daemon: &'a DaemonSpec, key: &str) -> DaemonResult<Vec<&'a Mapping>> {
    daemon
        .section(key)?
        .iter()
        .map(|entry| {
            entry
                .as_mapping()
                .ok_or_else(|| DaemonError::invalid_spec(key, "expected a list of mappings"))
        })
        .collect()
}

fn required(entry: &Mapping, section: &str, key: &str) -> DaemonResult<String> {
    entry
        .get(key)
        .and_then(scalar_text)
        .ok_or_else(|| DaemonError::missing(section, key))
}

/// `verb [name=N] k=v ...` over the scalar attributes of `entry`.
fn command_line_of(
    verb: &str,
    name: Option<&str>,
    entry: &Mapping,
    skip: &[&str],
) -> DaemonResult<String> {
    let mut words = vec![verb.to_string()];
    if let Some(name) = name {
        words.push(format!("name={name}"));
    }
    for (key, value) in entry {
        if skip.contains(&key.as_str()) {
            continue;
        }
        let value = scalar_text(value)
            .ok_or_else(|| DaemonError::invalid_spec(format!("{verb}.{key}"), "expected a scalar"))?;
        words.push(format!("{key}={value}"));
    }
    Ok(words.join(" "))
}

fn join_words(head: &[String], tail: &[String]) -> String {
    head.iter().chain(tail).map(String::as_str).collect::<Vec<_>>().join(" ")
}

fn scalar_text(node: &SpecNode) -> Option<String> {
    node.as_scalar().map(ToString::to_string)
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use serde_json::json;

    fn daemon(value: serde_json::Value) -> DaemonSpec {
        let node = SpecNode::try_from(value).unwrap();
        DaemonSpec::from_mapping(node.as_mapping().unwrap(), None).unwrap()
    }

    fn sampler_daemon() -> DaemonSpec {
        daemon(json!({
            "name": "sampler-daemon",
            "type": "ldmsd",
            "listen_xprt": "sock",
            "listen_port": 10000,
            "auth": [{"name": "munge1", "plugin": "munge", "socket": "/run/munge.sock"}],
            "listen": [{"xprt": "sock", "port": 10000}],
            "samplers": [{
                "plugin": "meminfo",
                "component_id": 3,
                "config": ["producer=%hostname%", "instance=%hostname%/%plugin%", "component_id=%component_id%"],
                "hostname": "node-1",
                "start": true,
                "offset": 0
            }],
            "prdcrs": [{"name": "agg-1", "host": "agg", "port": 10001, "type": "active"}],
            "config": ["prdcr_start_regex regex=.*", "updtr_start name=all"]
        }))
    }

    #[test]
    fn test_render_smplr_api() {
        let text = render_config(&sampler_daemon(), LdmsdVersion::new(4, 100, 0)).unwrap();
        assert_snapshot!(text, @r###"
        auth_add name=munge1 plugin=munge socket=/run/munge.sock
        listen xprt=sock port=10000
        load name=meminfo
        config name=meminfo producer=node-1 instance=node-1/meminfo component_id=3
        smplr_add name=meminfo_smplr instance=meminfo interval=2000000 offset=0
        smplr_start name=meminfo_smplr
        prdcr_add name=agg-1 host=agg port=10001 type=active
        prdcr_start_regex regex=.*
        updtr_start name=all
        "###);
    }

    #[test]
    fn test_render_v4_start() {
        let d = daemon(json!({
            "samplers": [
                {"plugin": "vmstat", "config": ["component_id=1"], "start": true, "interval": 1000000},
                {"plugin": "procstat", "config": [], "start": true, "interval": ""},
                {"plugin": "idle", "start": false}
            ]
        }));
        let text = render_config(&d, LdmsdVersion::new(4, 3, 7)).unwrap();
        assert_snapshot!(text, @r###"
        load name=vmstat
        config name=vmstat component_id=1
        start name=vmstat interval=1000000
        load name=procstat
        config name=procstat
        start name=procstat
        load name=idle
        config name=idle
        "###);
    }

    #[test]
    fn test_missing_sampler_variable() {
        let d = daemon(json!({"samplers": [{"plugin": "meminfo", "config": ["producer=%hostname%"]}]}));
        let err = render_config(&d, LdmsdVersion::default()).unwrap_err();
        assert_eq!(err.to_string(), "`samplers.meminfo` entry is missing `hostname`");
    }

    #[test]
    fn test_sections_must_be_lists_of_mappings() {
        let d = daemon(json!({"prdcrs": ["agg"]}));
        assert!(matches!(
            render_config(&d, LdmsdVersion::default()),
            Err(DaemonError::InvalidSpec { .. })
        ));
        let d = daemon(json!({"auth": [{"plugin": "munge"}]}));
        assert!(matches!(
            render_config(&d, LdmsdVersion::default()),
            Err(DaemonError::MissingAttribute { .. })
        ));
    }

    #[test]
    fn test_command_line() {
        assert_eq!(
            command_line(&sampler_daemon()),
            "ldmsd -x sock:10000 -a none -c /etc/ldmsd.conf -l /var/log/ldmsd.log -v INFO"
        );
        let d = daemon(json!({"listen_port": 411, "config_file": "/data/agg.conf"}));
        assert_eq!(
            command_line(&d),
            "ldmsd -a none -c /data/agg.conf -l /var/log/ldmsd.log -v INFO"
        );
    }

    #[test]
    fn test_controller_command() {
        assert_eq!(
            controller_command(&sampler_daemon(), "node-1"),
            "ldmsd_controller --host node-1 --xprt sock --port 10000 --auth none"
        );
        let d = daemon(json!({"listen_xprt": "rdma", "listen_port": 411, "listen_auth": "munge"}));
        assert_eq!(
            controller_command(&d, "agg"),
            "ldmsd_controller --host agg --xprt rdma --port 411 --auth munge"
        );
        assert_eq!(controller_input(&["status", "quit"]), "status\nquit\n");
    }
}
