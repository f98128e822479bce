//! CLI argument parsing tests for the ip command.
//!
//! Everything here fails (or prints help) during the argument scan, before
//! any socket is opened, so the tests need neither root nor network access.

use assert_cmd::Command;
use predicates::prelude::*;

fn ip_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ip"))
}

mod global_flags {
    use super::*;

    #[test]
    fn test_help() {
        ip_cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Network interface configuration tool"));
    }

    #[test]
    fn test_version() {
        ip_cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("ip"));
    }

    #[test]
    fn test_invalid_subcommand() {
        ip_cmd()
            .arg("route")
            .assert()
            .failure()
            .stderr(predicate::str::contains("error"));
    }
}

mod link_routing {
    use super::*;

    #[test]
    fn test_link_help() {
        ip_cmd()
            .args(["link", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Manage network interfaces"));
    }

    #[test]
    fn test_link_rejects_unknown_action() {
        ip_cmd()
            .args(["link", "bogus"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid argument \"bogus\""));
    }
}

mod link_set_parsing {
    use super::*;

    #[test]
    fn test_set_requires_dev() {
        ip_cmd()
            .args(["link", "set"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("\"dev\""));
    }

    #[test]
    fn test_set_keywords_alone_do_not_name_a_device() {
        ip_cmd()
            .args(["link", "set", "up", "mtu", "1400"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("\"dev\""));
    }

    #[test]
    fn test_set_rejects_duplicate_mtu() {
        ip_cmd()
            .args(["link", "set", "eth0", "mtu", "1400", "mtu", "1500"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("duplicate \"mtu\""));
    }

    #[test]
    fn test_set_rejects_duplicate_vrf() {
        ip_cmd()
            .args(["link", "set", "eth0", "vrf", "1", "vrf", "2"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("duplicate \"vrf\""));
    }

    #[test]
    fn test_set_rejects_duplicate_device() {
        ip_cmd()
            .args(["link", "set", "eth0", "eth1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("duplicate \"dev\""));
    }

    #[test]
    fn test_set_multicast_wants_on_or_off() {
        ip_cmd()
            .args(["link", "set", "eth0", "multicast", "maybe"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("\"on\" or \"off\""));
    }

    #[test]
    fn test_set_arp_wants_on_or_off() {
        ip_cmd()
            .args(["link", "set", "eth0", "arp", "sometimes"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("\"on\" or \"off\""));
    }

    #[test]
    fn test_set_mtu_requires_a_value() {
        ip_cmd()
            .args(["link", "set", "eth0", "mtu"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("requires a value"));
    }

    #[test]
    fn test_set_mtu_rejects_non_numeric_value() {
        ip_cmd()
            .args(["link", "set", "eth0", "mtu", "fast"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid \"mtu\" value"));
    }
}
