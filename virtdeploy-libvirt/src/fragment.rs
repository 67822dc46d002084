//! Network update fragments for DHCP and DNS host records.
//!
//! The daemon matches fragments literally, so attribute order and nesting here
//! are fixed. All builders are pure and deterministic.

use crate::error::{DriverError, Result};
use crate::types::{
    NetworkUpdate, UpdateCommand, UpdateSection, HOST_PARENT_INDEX, HOST_UPDATE_FLAGS,
};
use crate::xml::escape_value;

/// `<host mac="{mac}" name="{name}" ip="{ip}"/>`
pub fn dhcp_host_xml(name: &str, mac: &str, ip: &str) -> String {
    format!(
        r#"<host mac="{}" name="{}" ip="{}"/>"#,
        escape_value(mac),
        escape_value(name),
        escape_value(ip)
    )
}

/// `<host ip="{ip}"><hostname>{name}</hostname></host>`
pub fn dns_host_xml(name: &str, ip: &str) -> String {
    format!(
        r#"<host ip="{}"><hostname>{}</hostname></host>"#,
        escape_value(ip),
        escape_value(name)
    )
}

/// `<host ip="{ip}"/>`, used to delete from either host section.
pub fn host_ip_xml(ip: &str) -> String {
    format!(r#"<host ip="{}"/>"#, escape_value(ip))
}

/// Reject fragments libvirt cannot take as a C string.
///
/// Escaping leaves NUL untouched, so a NUL in any caller-supplied value
/// survives into the fragment.
pub fn check_fragment(xml: &[u8]) -> Result<()> {
    if xml.contains(&0) {
        return Err(DriverError::Xml(
            "update fragment contains a NUL byte".to_string(),
        ));
    }
    Ok(())
}

fn host_update(command: UpdateCommand, section: UpdateSection, xml: String) -> NetworkUpdate {
    NetworkUpdate {
        command,
        section,
        parent_index: HOST_PARENT_INDEX,
        xml: xml.into_bytes(),
        flags: HOST_UPDATE_FLAGS,
    }
}

/// Append a static DHCP reservation.
pub fn add_dhcp_host(name: &str, mac: &str, ip: &str) -> NetworkUpdate {
    host_update(UpdateCommand::AddLast, UpdateSection::IpDhcpHost, dhcp_host_xml(name, mac, ip))
}

/// Delete the static DHCP reservation for `ip`.
pub fn delete_dhcp_host(ip: &str) -> NetworkUpdate {
    host_update(UpdateCommand::Delete, UpdateSection::IpDhcpHost, host_ip_xml(ip))
}

/// Append a static DNS host record.
pub fn add_dns_host(name: &str, ip: &str) -> NetworkUpdate {
    host_update(UpdateCommand::AddLast, UpdateSection::DnsHost, dns_host_xml(name, ip))
}

/// Delete the static DNS host record for `ip`.
pub fn delete_dns_host(ip: &str) -> NetworkUpdate {
    host_update(UpdateCommand::Delete, UpdateSection::DnsHost, host_ip_xml(ip))
}
