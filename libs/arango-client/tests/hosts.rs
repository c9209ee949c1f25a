use arango_client::{ArangoConfig, ConfigError, HostAddress, HttpTransport, TransportError, parse_hosts};

#[test]
fn well_formed_hosts_must_parse() {
    let hosts = parse_hosts(["localhost:8529", "10.0.0.2:8530"]).unwrap();

    assert_eq!(
        hosts,
        vec![HostAddress::new("localhost", 8529), HostAddress::new("10.0.0.2", 8530)]
    );
}

#[test]
fn the_first_malformed_host_is_reported() {
    let err = parse_hosts(["a:1234", "bad-host"]).unwrap_err();

    match err {
        ConfigError::InvalidHost { host } => assert_eq!(host, "bad-host"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn hosts_must_have_exactly_one_colon_and_a_numeric_port() {
    for host in ["host:", ":8529", "host:85x9", "a:b:8529", "host:99999", "host:-1"] {
        assert!(host.parse::<HostAddress>().is_err(), "{host} should be rejected");
    }
}

#[test]
fn empty_host_list_defaults_to_local_server() {
    let config = ArangoConfig::default();

    assert_eq!(config.host_addresses().unwrap(), vec![HostAddress::new("127.0.0.1", 8529)]);
}

#[test]
fn building_the_transport_rejects_invalid_hosts() {
    let config = ArangoConfig {
        hosts: vec!["a:1234".to_owned(), "bad-host".to_owned()],
        ..Default::default()
    };

    let err = HttpTransport::new(&config).unwrap_err();

    assert!(matches!(
        err,
        TransportError::Config(ConfigError::InvalidHost { ref host }) if host == "bad-host"
    ));
}

#[test]
fn base_urls_follow_the_ssl_setting() {
    let config = ArangoConfig {
        hosts: vec!["db1:8529".to_owned(), "db2:8529".to_owned()],
        use_ssl: true,
        ..Default::default()
    };

    let transport = HttpTransport::new(&config).unwrap();

    assert_eq!(transport.endpoints(), ["https://db1:8529", "https://db2:8529"]);
}
