#[cfg(test)]
mod lock_controller_tests {
    use common::config::TimingConfig;
    use common::protocol::RemoteCommand;
    use node::{Action, ActuatorController, BindingIndicator, ButtonEdge, LockState};

    const TICK: u64 = 50;

    fn controller_with_auto_off(auto_off_ms: Option<u64>) -> ActuatorController {
        let timing = TimingConfig {
            auto_off_ms,
            ..TimingConfig::default()
        };
        ActuatorController::new(&timing)
    }

    #[test]
    fn test_deadline_invariant() {
        let mut controller = controller_with_auto_off(Some(3000));
        assert_eq!(controller.lock_state(), &LockState::default());

        controller.handle_remote(RemoteCommand::Engage, 100);
        assert_eq!(controller.lock_state().timeout_deadline, Some(3100));

        // 再次开锁重新计时
        controller.handle_remote(RemoteCommand::Engage, 2000);
        assert_eq!(controller.lock_state().timeout_deadline, Some(5000));

        controller.handle_remote(RemoteCommand::Disengage, 2500);
        assert_eq!(controller.lock_state().timeout_deadline, None);
    }

    #[test]
    fn test_timeout_transition_happens_exactly_once() {
        let mut controller = controller_with_auto_off(Some(3000));
        controller.handle_remote(RemoteCommand::Engage, 0);

        let mut releases = 0;
        let mut now = 0;
        while now <= 10_000 {
            let actions = controller.tick(now, true, None, None);
            releases += actions
                .iter()
                .filter(|a| **a == Action::Drive(false))
                .count();
            now += TICK;
        }
        assert_eq!(releases, 1);
    }

    #[test]
    fn test_override_sequence() {
        let mut controller = controller_with_auto_off(Some(30_000));
        let mut sent = Vec::new();

        let mut now = 0;
        while now <= 12_000 {
            let edge = match now {
                0 => Some(ButtonEdge::pressed(now)),
                1200 => Some(ButtonEdge::released(now)),
                _ => None,
            };
            for action in controller.tick(now, true, edge, None).iter() {
                if let Action::Send(command) = action {
                    sent.push((now, *command));
                }
            }
            now += TICK;
        }

        assert_eq!(
            sent,
            vec![
                (0, RemoteCommand::Engage),
                (500, RemoteCommand::Engage),
                (1000, RemoteCommand::Engage),
                (6200, RemoteCommand::Disengage),
            ]
        );
        assert!(!controller.is_engaged());
    }

    #[test]
    fn test_unbind_resets_override() {
        let mut controller = controller_with_auto_off(Some(30_000));
        controller.tick(0, true, Some(ButtonEdge::pressed(0)), Some(ButtonEdge::pressed(0)));

        let actions = controller.tick(5000, true, None, None);
        assert!(actions.contains(&Action::Unbind));
        assert!(actions.contains(&Action::Drive(false)));
        assert!(!actions.iter().any(|a| matches!(a, Action::Send(_))));

        // 解绑后释放手动开关不会再发送 OFF
        let mut later = Vec::new();
        controller.tick(5050, true, Some(ButtonEdge::released(5050)), None);
        for now in (5100..=12_000).step_by(50) {
            later.extend(controller.tick(now, true, None, None).iter().copied());
        }
        assert!(later.is_empty());
    }

    #[test]
    fn test_indicator_toggle_count() {
        let mut indicator = BindingIndicator::new(400);
        let start = indicator.update(false, 1000);
        assert!(!start);

        assert!(!indicator.update(false, 1399));
        assert!(indicator.update(false, 1400));
        assert!(!indicator.update(false, 1800));
    }
}
