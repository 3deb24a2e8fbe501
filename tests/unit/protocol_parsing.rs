#[cfg(test)]
mod protocol_parsing_tests {
    use common::protocol::{classify, OutboundCommand, ProtocolEvent, RemoteCommand};
    use common::utils::hex;
    use common::utils::LineBuffer;

    #[test]
    fn test_payload_hex_round_trip() {
        for len in [0usize, 1, 2, 19, 20] {
            let data: Vec<u8> = (0..len as u8).map(|b| b.wrapping_mul(37)).collect();
            let encoded = OutboundCommand::payload(&data).encode();

            // 去掉 "AT+MDTS 0 " 前缀和 CR LF
            let text = &encoded[10..encoded.len() - 2];
            assert!(text.iter().all(|c| !c.is_ascii_lowercase()));
            let decoded: heapless::Vec<u8, 20> = hex::decode(text).unwrap();
            assert_eq!(&decoded[..], &data[..]);
        }
    }

    #[test]
    fn test_long_payload_keeps_first_twenty_bytes() {
        let data: Vec<u8> = (0..64u8).collect();
        let encoded = OutboundCommand::payload(&data).encode();
        let text = &encoded[10..encoded.len() - 2];
        assert_eq!(text.len(), 40);

        let decoded: heapless::Vec<u8, 20> = hex::decode(text).unwrap();
        assert_eq!(&decoded[..], &data[..20]);
    }

    #[test]
    fn test_wire_commands() {
        assert_eq!(&OutboundCommand::Reboot.encode()[..], b"AT+REBOOT\r\n");
        assert_eq!(&OutboundCommand::Unbind.encode()[..], b"AT+NR\r\n");
        assert_eq!(
            &RemoteCommand::Disengage.to_outbound().encode()[..],
            b"AT+MDTS 0 4F4646\r\n"
        );
    }

    #[test]
    fn test_classification_priority() {
        // 状态行优先于其他标记
        let line = b"PROV-MSG SUCCESS MDTSG-MSG:ON";
        assert!(matches!(
            classify(line),
            ProtocolEvent::BindingChanged { bound: true, .. }
        ));

        assert_eq!(classify(b"MDTS-MSG SUCCESS"), ProtocolEvent::SendAcknowledged);

        match classify(b"MDTS-MSG 0x0028 0 31") {
            ProtocolEvent::PeerData { sender, payload } => {
                assert_eq!(sender.as_str(), "0x0028");
                assert_eq!(payload.as_str(), "31");
            }
            other => panic!("unexpected event: {:?}", other),
        }

        match classify(b"MDTSG-MSG:  OFF ") {
            ProtocolEvent::GroupMessage(payload) => assert_eq!(&payload[..], b"OFF"),
            other => panic!("unexpected event: {:?}", other),
        }

        match classify(b"MDTPG:4F4E") {
            ProtocolEvent::PointMessage(payload) => assert_eq!(&payload[..], b"4F4E"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_lines_are_unrecognized() {
        for line in [
            &b"MDTS-MSG 0x0028"[..],
            b"MDTS-MSG 0x0028 1 31",
            b"REBOOT-MSG SUCCESS",
            b"",
            b"\xff\xfe garbage",
        ] {
            assert!(
                matches!(classify(line), ProtocolEvent::Unrecognized(_)),
                "line {:?}",
                line
            );
        }
    }

    #[test]
    fn test_line_buffer_feeds_classifier() {
        let mut buffer: LineBuffer<128> = LineBuffer::new();
        let mut events = Vec::new();
        for &b in b"SYS-MSG DEVICE UNPROV\r\nMDTS-MSG SUCC".iter() {
            if let Some(line) = buffer.push(b) {
                events.push(classify(&line));
            }
        }
        for &b in b"ESS\r\n".iter() {
            if let Some(line) = buffer.push(b) {
                events.push(classify(&line));
            }
        }

        assert_eq!(
            events,
            vec![
                ProtocolEvent::BindingChanged {
                    bound: false,
                    module_id: None
                },
                ProtocolEvent::SendAcknowledged,
            ]
        );
    }

    #[test]
    fn test_remote_command_sources() {
        assert_eq!(RemoteCommand::from_peer_hex(b"4F4E"), Some(RemoteCommand::Engage));
        assert_eq!(RemoteCommand::from_peer_hex(b"ON"), None);
        assert_eq!(RemoteCommand::from_push(b" ON "), Some(RemoteCommand::Engage));
        assert_eq!(RemoteCommand::from_push(b"4f4646"), Some(RemoteCommand::Disengage));
        assert_eq!(RemoteCommand::from_push(b"OPEN"), None);
    }
}
