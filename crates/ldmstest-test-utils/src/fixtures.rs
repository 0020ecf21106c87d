//! Canned inputs shared by the integration tests.

/// Two sampler nodes built from templates plus one aggregator.
pub const SAMPLE_CLUSTER_SPEC: &str = r#"{
  "name": "agg-cluster",
  "description": "two meminfo samplers and an aggregator",
  "env": { "LDMSD_MEM_SZ": "16M" },
  "templates": {
    "ldmsd-sampler": {
      "type": "ldmsd",
      "listen_xprt": "sock",
      "listen_port": 10000,
      "samplers": [
        {
          "plugin": "meminfo",
          "interval": 1000000,
          "offset": 0,
          "start": true,
          "config": [
            "component_id=%component_id%",
            "instance=%hostname%/%plugin%",
            "producer=%hostname%"
          ]
        }
      ]
    },
    "compute-node": {
      "daemons": [
        { "name": "sshd", "type": "sshd" },
        { "name": "sampler-daemon", "!extends": "ldmsd-sampler" }
      ]
    }
  },
  "nodes": [
    { "hostname": "node-1", "component_id": 10001, "!extends": "compute-node" },
    { "hostname": "node-2", "component_id": 10002, "!extends": "compute-node" },
    {
      "hostname": "agg-1",
      "daemons": [
        {
          "name": "aggregator",
          "type": "ldmsd",
          "listen_xprt": "sock",
          "listen_port": 20001,
          "env": ["LDMSD_MEM_SZ=64M"],
          "prdcrs": [
            {
              "name": "node-1",
              "host": "node-1",
              "port": 10000,
              "xprt": "sock",
              "type": "active",
              "interval": 1000000
            }
          ],
          "config": [
            "prdcr_start_regex regex=.*",
            "updtr_add name=all interval=1000000 offset=500000",
            "updtr_prdcr_add name=all regex=.*",
            "updtr_start name=all"
          ]
        }
      ]
    }
  ]
}"#;

/// `ldms_ls -l` output for two sets of one producer.
pub const SAMPLE_LDMS_LS: &str = "\
Schema         Instance                 Flags  Msize  Dsize  UID    GID    Perm       Update            Duration          Info
-------------- ------------------------ ------ ------ ------ ------ ------ ---------- ----------------- ----------------- --------
meminfo        node-1/meminfo           CL       1264    1448      0      0 -r--r----- 1583868819.002253          0.000169 \"updt_hint_us\"=\"1000000:0\"
vmstat         node-1/vmstat            CL       4272    1096      0      0 -r--r----- 1583868819.002581          0.000203 \"updt_hint_us\"=\"1000000:0\"
-------------- ------------------------ ------ ------ ------ ------ ------ ---------- ----------------- ----------------- --------
Total Sets: 2, Meta Data (kB): 5.54, Data (kB): 2.54, Memory (kB): 8.08
==============================================================================

node-1/meminfo: consistent, last update: Tue Mar 10 14:33:39 2020 -0500 [2253us]
M u64        component_id                               10001
D u64        job_id                                     0
D u64        app_id                                     0
D u64        MemTotal                                   16333364 kB
D u64        MemFree                                    11466844 kB
D char[]     hostname                                   \"node-1\"

node-1/vmstat: consistent, last update: Tue Mar 10 14:33:39 2020 -0500 [2581us]
M u64        component_id                               10001
D u64        job_id                                     0
D s32[]      cpu_delta                                  \"-3,0,17\"
D d64[]      load                                       0.5,0.25,0.125
D char       state                                      'R'
";
