use insta::assert_snapshot;
use ldmstest_ldmsd::{command_line, controller_command, render_config, DaemonSpec, LdmsdVersion};
use ldmstest_spec::Spec;
use ldmstest_test_utils::{assert_ok, SAMPLE_CLUSTER_SPEC};

fn daemon(host: &str) -> DaemonSpec {
    let spec = assert_ok!(Spec::from_json_str(SAMPLE_CLUSTER_SPEC));
    assert_ok!(DaemonSpec::for_host(&spec, host)).expect("ldmsd on host")
}

#[test]
fn sampler_node_config() {
    let text = assert_ok!(render_config(&daemon("node-2"), LdmsdVersion::default()));
    assert_snapshot!(text, @r###"
    load name=meminfo
    config name=meminfo component_id=10002 instance=node-2/meminfo producer=node-2
    smplr_add name=meminfo_smplr instance=meminfo interval=1000000 offset=0
    smplr_start name=meminfo_smplr
    "###);
}

#[test]
fn aggregator_config_and_command() {
    let agg = daemon("agg-1");
    let text = assert_ok!(render_config(&agg, LdmsdVersion::new(4, 3, 11)));
    assert_snapshot!(text, @r###"
    prdcr_add name=node-1 host=node-1 port=10000 xprt=sock type=active interval=1000000
    prdcr_start_regex regex=.*
    updtr_add name=all interval=1000000 offset=500000
    updtr_prdcr_add name=all regex=.*
    updtr_start name=all
    "###);

    assert_eq!(
        command_line(&agg),
        "ldmsd -x sock:20001 -a none -c /etc/ldmsd.conf -l /var/log/ldmsd.log -v INFO"
    );
    assert_eq!(
        controller_command(&agg, "agg-1"),
        "ldmsd_controller --host agg-1 --xprt sock --port 20001 --auth none"
    );
    assert_eq!(agg.env()["LDMSD_MEM_SZ"], "64M");
}

#[test]
fn nodes_without_ldmsd() {
    let spec = assert_ok!(Spec::from_json_str(SAMPLE_CLUSTER_SPEC));
    assert!(assert_ok!(DaemonSpec::for_host(&spec, "missing-host")).is_none());
}
