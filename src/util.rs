use std::net::{IpAddr, Ipv4Addr};

const MONITOR_PORT: &str = "MONITOR_PORT";

const DEFAULT_PORT: u16 = 3000;

pub fn get_default_port() -> u16 {
    DEFAULT_PORT
}

pub fn get_port() -> Option<u16> {
    std::env::var(MONITOR_PORT)
        .ok()
        .and_then(|port| port.parse().ok())
}

const MONITOR_ADDR: &str = "MONITOR_ADDR";

const DEFAULT_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0));

pub fn get_default_addr() -> IpAddr {
    DEFAULT_ADDR
}

pub fn get_addr() -> Option<IpAddr> {
    std::env::var(MONITOR_ADDR)
        .ok()
        .and_then(|addr| addr.parse().ok())
}

const MONITOR_TARGET: &str = "MONITOR_TARGET";

pub fn get_target() -> Option<String> {
    std::env::var(MONITOR_TARGET)
        .ok()
        .filter(|target| !target.trim().is_empty())
}
