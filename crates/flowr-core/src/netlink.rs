//! Default-route lookup over rtnetlink.
//!
//! Each probe opens its own netlink connection, drives it on a background task for the
//! duration of the lookup, and tears it down afterwards.

use std::net::IpAddr;

use futures::stream::TryStreamExt;
use log::debug;
use netlink_packet_route::{
    link::{LinkAttribute, LinkMessage},
    route::{RouteAddress, RouteAttribute, RouteMessage},
};
use rtnetlink::{new_connection, Handle, IpVersion};

use crate::connectivity::{
    format_mac, select_default_route, ActiveInterface, ProbeError, RouteCandidate,
};

pub(crate) async fn active_interface() -> Result<ActiveInterface, ProbeError> {
    let (connection, handle, _) = new_connection().map_err(ProbeError::Connection)?;
    let connection = tokio::spawn(connection);
    let result = lookup_active_interface(&handle).await;
    connection.abort();
    result
}

async fn lookup_active_interface(handle: &Handle) -> Result<ActiveInterface, ProbeError> {
    let mut routes = handle.route().get(IpVersion::V4).execute();
    let mut candidates = Vec::new();
    while let Some(route) = routes
        .try_next()
        .await
        .map_err(|error| ProbeError::netlink("route dump", error))?
    {
        candidates.push(route_candidate(&route));
    }

    let route = select_default_route(&candidates).ok_or(ProbeError::NoActiveInterface)?;
    let mut links = handle
        .link()
        .get()
        .match_index(route.interface_index)
        .execute();
    let link = links
        .try_next()
        .await
        .map_err(|error| ProbeError::netlink("link lookup", error))?
        .ok_or(ProbeError::NoActiveInterface)?;

    let (name, mac_address) = link_identity(link);
    let name = name.unwrap_or_else(|| format!("if{}", route.interface_index));
    if mac_address.is_none() {
        debug!("no hardware address for {name}");
    }

    Ok(ActiveInterface {
        name,
        gateway_ip: Some(route.gateway),
        mac_address,
    })
}

fn route_candidate(route: &RouteMessage) -> RouteCandidate {
    let mut candidate = RouteCandidate {
        prefix_len: route.header.destination_prefix_length,
        ..RouteCandidate::default()
    };
    for attribute in &route.attributes {
        match attribute {
            RouteAttribute::Destination(destination) => {
                candidate.destination = route_address_to_ipaddr(destination);
            }
            RouteAttribute::Gateway(gateway) => {
                candidate.gateway = route_address_to_ipaddr(gateway);
            }
            RouteAttribute::Oif(index) => candidate.interface_index = Some(*index),
            RouteAttribute::Priority(metric) => candidate.metric = Some(*metric),
            _ => {}
        }
    }
    candidate
}

fn route_address_to_ipaddr(address: &RouteAddress) -> Option<IpAddr> {
    match address {
        RouteAddress::Inet(v4) => Some(IpAddr::V4(*v4)),
        RouteAddress::Inet6(v6) => Some(IpAddr::V6(*v6)),
        _ => None,
    }
}

fn link_identity(link: LinkMessage) -> (Option<String>, Option<String>) {
    let mut name = None;
    let mut mac_address = None;
    for attribute in link.attributes {
        match attribute {
            LinkAttribute::IfName(value) => name = Some(value),
            LinkAttribute::Address(bytes) => mac_address = format_mac(&bytes),
            _ => {}
        }
    }
    (name, mac_address)
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    #[test]
    fn route_candidate_reads_default_route_attributes() {
        let mut route = RouteMessage::default();
        route.header.destination_prefix_length = 0;
        route.attributes.push(RouteAttribute::Gateway(RouteAddress::Inet(
            Ipv4Addr::new(10, 0, 0, 1),
        )));
        route.attributes.push(RouteAttribute::Oif(2));
        route.attributes.push(RouteAttribute::Priority(100));

        assert_eq!(
            route_candidate(&route),
            RouteCandidate {
                prefix_len: 0,
                destination: None,
                gateway: Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))),
                interface_index: Some(2),
                metric: Some(100),
            }
        );
    }

    #[test]
    fn link_identity_reads_name_and_address() {
        let mut link = LinkMessage::default();
        link.attributes.push(LinkAttribute::IfName("eth0".to_string()));
        link.attributes.push(LinkAttribute::Address(vec![
            0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff,
        ]));

        assert_eq!(
            link_identity(link),
            (
                Some("eth0".to_string()),
                Some("aa:bb:cc:dd:ee:ff".to_string())
            )
        );
    }
}
