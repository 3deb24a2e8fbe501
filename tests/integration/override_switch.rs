#[cfg(test)]
mod override_switch_tests {
    use common::config::NodeConfig;
    use common::hal::Clock;
    use common::hal::simulator::{SimBoard, SimClock, SimHandles};
    use node::NodeApp;

    const ON: &str = "AT+MDTS 0 4F4E";
    const OFF: &str = "AT+MDTS 0 4F4646";

    fn bound_switch() -> (NodeApp<SimBoard>, SimHandles) {
        let mut config = NodeConfig::default();
        config.link.recv_timeout_ms = 1;

        let (board, handles) = SimBoard::new(SimClock::manual());
        let mut app = NodeApp::new(board, config);
        handles.module.push_line("PROV-MSG SUCCESS 0x0031");
        assert!(app.start());
        handles.module.written_lines();
        (app, handles)
    }

    /// 运行 `ms` 毫秒，记录每条写出指令的时间
    fn record(app: &mut NodeApp<SimBoard>, handles: &SimHandles, ms: u64) -> Vec<(u64, String)> {
        let mut sent = Vec::new();
        let until = handles.clock.now_ms() + ms;
        while handles.clock.now_ms() < until {
            let now = handles.clock.now_ms();
            app.tick();
            for line in handles.module.written_lines() {
                sent.push((now, line));
            }
        }
        sent
    }

    fn at(now: u64, line: &str) -> (u64, String) {
        (now, line.to_string())
    }

    #[test]
    fn test_hold_repeats_every_interval() {
        let (mut app, handles) = bound_switch();
        handles.override_button.press();

        let sent = record(&mut app, &handles, 1200);
        assert_eq!(sent, vec![at(0, ON), at(500, ON), at(1000, ON)]);
        assert!(handles.relay.is_set());
    }

    #[test]
    fn test_release_sends_off_after_delay() {
        let (mut app, handles) = bound_switch();
        handles.override_button.press();
        record(&mut app, &handles, 200);

        handles.override_button.release();
        let sent = record(&mut app, &handles, 10_000);
        assert_eq!(sent, vec![at(5200, OFF)]);
        assert!(!handles.relay.is_set());
    }

    #[test]
    fn test_repress_cancels_pending_off() {
        let (mut app, handles) = bound_switch();
        handles.override_button.press();
        record(&mut app, &handles, 200);

        handles.override_button.release();
        record(&mut app, &handles, 3000);

        handles.override_button.press();
        let sent = record(&mut app, &handles, 8000);
        assert!(sent.iter().all(|(_, line)| line == ON));
        assert_eq!(sent.first(), Some(&at(3200, ON)));
        assert!(handles.relay.is_set());
    }

    #[test]
    fn test_acknowledgement_does_not_change_state() {
        let (mut app, handles) = bound_switch();
        handles.override_button.press();
        record(&mut app, &handles, 100);

        handles.module.push_line("MDTS-MSG SUCCESS");
        record(&mut app, &handles, 100);
        assert!(app.controller().is_engaged());
        assert!(app.link().is_bound());
    }

    #[test]
    fn test_unbound_switch_sends_nothing() {
        let (mut app, handles) = bound_switch();
        handles.module.push_line("SYS-MSG DEVICE UNPROV");
        record(&mut app, &handles, 50);

        handles.override_button.press();
        let sent = record(&mut app, &handles, 2000);
        assert!(sent.is_empty());
        assert!(!handles.relay.is_set());
    }

    #[test]
    fn test_unbind_during_override_hold() {
        let (mut app, handles) = bound_switch();
        handles.override_button.press();
        handles.unbind_button.press();

        let sent = record(&mut app, &handles, 6000);
        let unbinds: Vec<_> = sent.iter().filter(|(_, line)| line == "AT+NR").collect();
        assert_eq!(unbinds, vec![&at(5000, "AT+NR")]);
        assert!(!sent.iter().any(|(_, line)| line == OFF));
        assert!(!handles.relay.is_set());
        assert!(!app.link().is_bound());
    }
}
