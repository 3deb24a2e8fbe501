#[cfg(test)]
mod remote_lock_tests {
    use common::config::NodeConfig;
    use common::hal::Clock;
    use common::hal::simulator::{sim_link, ModuleScript, SimBoard, SimClock, SimHandles};
    use common::link::MeshLink;
    use common::protocol::{OutboundCommand, ProtocolEvent};
    use node::NodeApp;

    fn test_config() -> NodeConfig {
        let mut config = NodeConfig::default();
        config.link.recv_timeout_ms = 1;
        config.link.reboot_timeout_ms = 500;
        config.timing.auto_off_ms = Some(3000);
        config
    }

    /// 模组在重启后报告已绑定
    fn bound_node() -> (NodeApp<SimBoard>, SimHandles) {
        let (board, handles) = SimBoard::new(SimClock::manual());
        let mut app = NodeApp::new(board, test_config());
        handles.module.push_line("REBOOT-MSG SUCCESS");
        handles.module.push_line("SYS-MSG DEVICE PROV-ED 0x0028");

        assert!(app.start());
        assert_eq!(handles.module.written_lines(), vec!["AT+REBOOT".to_string()]);
        (app, handles)
    }

    fn run_for(app: &mut NodeApp<SimBoard>, handles: &SimHandles, ms: u64) {
        let until = handles.clock.now_ms() + ms;
        while handles.clock.now_ms() < until {
            app.tick();
        }
    }

    #[test]
    fn test_peer_data_scenario() {
        let (transport, module) = sim_link();
        let mut link = MeshLink::new(transport);

        module.push_line("SYS-MSG DEVICE PROV-ED 0x0001");
        assert!(matches!(
            link.poll(10),
            Some(ProtocolEvent::BindingChanged { bound: true, .. })
        ));

        module.push_line("MDTS-MSG 0x0028 0 31");
        match link.poll(10) {
            Some(ProtocolEvent::PeerData { sender, payload }) => {
                assert_eq!(sender.as_str(), "0x0028");
                assert_eq!(payload.as_str(), "31");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_unbound_send_is_rejected() {
        let (transport, module) = sim_link();
        let mut link = MeshLink::new(transport);

        assert!(!link.send(&OutboundCommand::payload(b"ON")));
        assert!(module.written_lines().is_empty());

        // 不需要绑定的指令照常写出
        assert!(link.send(&OutboundCommand::Reboot));
        assert_eq!(module.written_lines(), vec!["AT+REBOOT".to_string()]);
    }

    #[test]
    fn test_binding_persists_until_unprovisioned() {
        let (mut app, handles) = bound_node();
        handles.module.push_line("MDTS-MSG SUCCESS");
        handles.module.push_line("ERR-MSG UNKNOWN CMD");
        run_for(&mut app, &handles, 200);
        assert!(app.link().is_bound());

        handles.module.push_line("SYS-MSG DEVICE UNPROV");
        run_for(&mut app, &handles, 100);
        assert!(!app.link().is_bound());
        assert_eq!(app.link().module_id(), None);
    }

    #[test]
    fn test_remote_on_then_auto_off() {
        let (mut app, handles) = bound_node();

        handles.module.push_line("MDTS-MSG 0x0028 0 4F4E");
        app.tick();
        assert!(handles.relay.is_set());
        assert!(handles.lock_led.is_set());
        assert!(app.controller().is_engaged());

        run_for(&mut app, &handles, 2800);
        assert!(handles.relay.is_set());

        run_for(&mut app, &handles, 300);
        assert!(!handles.relay.is_set());
        assert!(!handles.lock_led.is_set());
        // 远程指令不会产生下行发送
        assert!(handles.module.written_lines().is_empty());
    }

    #[test]
    fn test_remote_off_before_timeout() {
        let (mut app, handles) = bound_node();

        handles.module.push_line("MDTSG-MSG:ON");
        app.tick();
        assert!(handles.relay.is_set());

        handles.module.push_line("MDTPG: OFF");
        app.tick();
        assert!(!handles.relay.is_set());
        assert_eq!(app.controller().lock_state().timeout_deadline, None);
    }

    #[test]
    fn test_unknown_remote_payload_ignored() {
        let (mut app, handles) = bound_node();
        handles.module.push_line("MDTSG-MSG:UNLOCK");
        handles.module.push_line("MDTS-MSG 0x0028 0 ZZ");
        run_for(&mut app, &handles, 200);
        assert!(!handles.relay.is_set());
    }

    #[test]
    fn test_long_press_unbind() {
        let (mut app, handles) = bound_node();
        handles.unbind_button.press();

        run_for(&mut app, &handles, 4900);
        assert!(app.link().is_bound());
        assert!(handles.module.written_lines().is_empty());

        run_for(&mut app, &handles, 1000);
        assert!(!app.link().is_bound());
        assert_eq!(handles.module.written_lines(), vec!["AT+NR".to_string()]);

        // 保持按住也不会再次解绑
        run_for(&mut app, &handles, 6000);
        assert!(handles.module.written_lines().is_empty());
    }

    #[test]
    fn test_status_led_follows_binding() {
        let (mut app, handles) = bound_node();
        app.tick();
        assert!(handles.status_led.is_set());

        handles.module.push_line("SYS-MSG DEVICE UNPROV");
        app.tick();
        assert!(!handles.status_led.is_set());

        let mut toggles = 0;
        let mut previous = handles.status_led.is_set();
        for _ in 0..16 {
            app.tick();
            if handles.status_led.is_set() != previous {
                toggles += 1;
                previous = handles.status_led.is_set();
            }
        }
        assert_eq!(toggles, 2);
    }

    #[test]
    fn test_reboot_with_scripted_module() {
        let (board, handles) = SimBoard::new(SimClock::manual());
        let mut app = NodeApp::new(board, test_config());
        let responder = handles.module.spawn_responder(ModuleScript::default());

        assert!(app.start());
        assert_eq!(app.link().module_id().map(|id| id.as_str()), Some("0x0028"));

        drop(app);
        responder.join().unwrap();
    }

    #[test]
    fn test_reboot_with_unprovisioned_module() {
        let (board, handles) = SimBoard::new(SimClock::manual());
        let mut app = NodeApp::new(board, test_config());
        let script = ModuleScript {
            provisioned: false,
            ..ModuleScript::default()
        };
        let responder = handles.module.spawn_responder(script);

        assert!(!app.start());
        app.tick();
        assert!(!handles.status_led.is_set());

        drop(app);
        responder.join().unwrap();
    }
}
