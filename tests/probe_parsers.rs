use netdiag::probe::{
    dns::parse_nslookup,
    ping::parse_ping,
    traceroute::{parse_hop, parse_traceroute},
    Hop,
};
use std::time::Duration;

#[test]
fn ping_bsd_summary() {
    let out = "4 packets transmitted, 4 received, 0.0% packet loss\n\
               round-trip min/avg/max/stddev = 6.1/11.5/14.4/3.2 ms";
    let stats = parse_ping(out);
    assert_eq!(stats.packet_loss_percent, Some(0.0));
    assert_eq!(stats.avg_rtt_ms, Some(11.5));
    assert_eq!(stats.min_rtt_ms, Some(6.1));
    assert_eq!(stats.max_rtt_ms, Some(14.4));
}

#[test]
fn ping_linux_summary() {
    let out = "--- example.com ping statistics ---\n\
               4 packets transmitted, 4 received, 25% packet loss, time 3004ms\n\
               rtt min/avg/max/mdev = 9.876/10.234/11.002/0.412 ms\n";
    let stats = parse_ping(out);
    assert_eq!(stats.packet_loss_percent, Some(25.0));
    assert_eq!(stats.min_rtt_ms, Some(9.876));
    assert_eq!(stats.avg_rtt_ms, Some(10.234));
    assert_eq!(stats.max_rtt_ms, Some(11.002));
}

#[test]
fn ping_total_loss_keeps_rtt_empty() {
    let out = "4 packets transmitted, 0 received, +4 errors, 100% packet loss, time 3004ms\n";
    let stats = parse_ping(out);
    assert_eq!(stats.packet_loss_percent, Some(100.0));
    assert_eq!(stats.avg_rtt_ms, None);
    assert_eq!(stats.min_rtt_ms, None);
    assert_eq!(stats.max_rtt_ms, None);
}

#[test]
fn ping_unrecognized_output_yields_nulls() {
    let stats = parse_ping("something entirely different\n");
    assert_eq!(stats.packet_loss_percent, None);
    assert_eq!(stats.avg_rtt_ms, None);
}

#[test]
fn nslookup_skips_resolver_port_line() {
    let out = "Server: 10.0.0.1\nAddress: 10.0.0.1#53\n\nName: example.com\nAddress: 93.184.216.34";
    let answer = parse_nslookup(out, Duration::from_millis(40));
    assert!(answer.resolved);
    assert_eq!(answer.ip_addresses, vec!["93.184.216.34".to_string()]);
    assert_eq!(answer.dns_server.as_deref(), Some("10.0.0.1"));
    assert_eq!(answer.response_time_ms, 40.0);
}

#[test]
fn nslookup_collects_every_answer_in_order() {
    let out = "Server:\t\t127.0.0.53\nAddress:\t127.0.0.53#53\n\n\
               Non-authoritative answer:\nName:\tgoogle.com\nAddress: 142.250.1.100\n\
               Name:\tgoogle.com\nAddress: 142.250.1.101\n\
               Name:\tgoogle.com\nAddress: 2607:f8b0:4004:c07::64\n";
    let answer = parse_nslookup(out, Duration::from_millis(5));
    assert_eq!(
        answer.ip_addresses,
        vec!["142.250.1.100", "142.250.1.101", "2607:f8b0:4004:c07::64"]
    );
}

#[test]
fn nslookup_without_answers_is_unresolved() {
    let out = "Server: 10.0.0.1\nAddress: 10.0.0.1#53\n\n*** Can't find nothing.invalid: No answer\n";
    let answer = parse_nslookup(out, Duration::from_millis(1234));
    assert!(!answer.resolved);
    assert!(answer.ip_addresses.is_empty());
    assert_eq!(answer.response_time_ms, 1234.0);
}

#[test]
fn hop_with_three_timings() {
    let hop = parse_hop("3  10.0.0.1 (10.0.0.1)  12.345 ms  13.456 ms  14.567 ms").unwrap();
    assert_eq!(
        hop,
        Hop {
            hop_num: 3,
            ip: Some("10.0.0.1".into()),
            rtt_ms: Some(13.456),
            timed_out: false,
        }
    );
}

#[test]
fn hop_fully_timed_out() {
    let hop = parse_hop("4  * * *").unwrap();
    assert_eq!(
        hop,
        Hop {
            hop_num: 4,
            ip: None,
            rtt_ms: None,
            timed_out: true,
        }
    );
}

#[test]
fn hop_partially_timed_out() {
    let hop = parse_hop(" 7  edge.example.net (203.0.113.9)  5.0 ms *  6.0 ms").unwrap();
    assert_eq!(hop.ip.as_deref(), Some("203.0.113.9"));
    assert_eq!(hop.rtt_ms, Some(5.5));
    assert!(hop.timed_out);
}

#[test]
fn header_line_is_not_a_hop() {
    assert!(parse_hop("traceroute to example.com (93.184.216.34), 30 hops max").is_none());
    assert!(parse_hop("").is_none());
}

#[test]
fn traceroute_reaching_destination() {
    let out = "traceroute to example.com (93.184.216.34), 30 hops max, 60 byte packets\n\
               \n 1  gw (192.168.1.1)  1.0 ms  2.0 ms  3.0 ms\n\
               \n 2  93.184.216.34 (93.184.216.34)  10.0 ms  11.0 ms  12.0 ms\n";
    let trace = parse_traceroute(out);
    assert_eq!(trace.total_hops, 2);
    assert_eq!(trace.hops[0].rtt_ms, Some(2.0));
    assert!(trace.reached_destination);
}

#[test]
fn traceroute_ending_in_timeouts_did_not_arrive() {
    let out = " 1  gw (192.168.1.1)  1.0 ms  2.0 ms  3.0 ms\n 2  * * *\n 3  * * *\n";
    let trace = parse_traceroute(out);
    assert_eq!(trace.total_hops, 3);
    assert!(!trace.reached_destination);
    assert!(trace.hops[2].timed_out);
}

#[test]
fn traceroute_keeps_line_order_even_if_not_ascending() {
    let out = " 2  a (10.0.0.2)  2.0 ms\n 1  b (10.0.0.1)  1.0 ms\n";
    let trace = parse_traceroute(out);
    let nums: Vec<u32> = trace.hops.iter().map(|h| h.hop_num).collect();
    assert_eq!(nums, vec![2, 1]);
}

#[test]
fn traceroute_with_no_hops() {
    let trace = parse_traceroute("traceroute to x (10.9.9.9), 30 hops max\n");
    assert!(trace.hops.is_empty());
    assert_eq!(trace.total_hops, 0);
    assert!(!trace.reached_destination);
}
