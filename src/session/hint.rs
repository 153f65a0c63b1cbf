//! Hint mode: label every detected target and click the one whose code
//! gets typed.

use super::{clear_quietly, SessionError};
use crate::codes::{Alphabet, Code};
use crate::command::Target;
use crate::matcher::{MatchEngine, MatchStep};
use crate::traits::{ClickDispatcher, ElementDetector, Feedback, OverlayRenderer};
use log::{debug, info, warn};

/// What a hint session call left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HintOutcome {
    /// The session is waiting for more input.
    Active,
    /// Detection found nothing; the session never started.
    NoTargets,
    /// A target was resolved and activated.  The session is over.
    Activated(Target),
    /// The session was torn down without selecting anything.
    Cancelled,
}

/// One activation of hint mode.
///
/// Targets and their codes are fixed at [`activate`](Self::activate) time
/// and dropped at deactivation; nothing carries over to the next session.
#[derive(Debug, Default)]
pub struct HintSession {
    labels: Vec<(Code, Target)>,
    engine: Option<MatchEngine>,
}

impl HintSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.engine.is_some()
    }

    /// The `(code, target)` pairs of this session, in detection order.
    pub fn labels(&self) -> &[(Code, Target)] {
        &self.labels
    }

    /// Input typed so far.
    pub fn prefix(&self) -> &str {
        self.engine.as_ref().map(MatchEngine::prefix).unwrap_or("")
    }

    /// Detect targets, assign codes, and draw the labels.
    ///
    /// Returns [`HintOutcome::NoTargets`] (after asking the overlay for
    /// feedback) when there is nothing to label.
    pub fn activate<D, O>(
        &mut self,
        alphabet: &Alphabet,
        detector: &D,
        overlay: &mut O,
    ) -> Result<HintOutcome, SessionError>
    where
        D: ElementDetector,
        O: OverlayRenderer,
    {
        if self.is_active() {
            return Ok(HintOutcome::Active);
        }

        let targets = detector.detect();
        if targets.is_empty() {
            info!("no clickable targets detected");
            if let Err(e) = overlay.feedback(Feedback::NoTargets) {
                warn!("feedback failed: {}", e);
            }
            return Ok(HintOutcome::NoTargets);
        }

        let codes = alphabet.generate(targets.len());
        info!("labelling {} target(s)", targets.len());
        self.labels = codes.iter().cloned().zip(targets).collect();

        if let Err(e) = overlay.render_labels(&self.labels) {
            clear_quietly(overlay);
            self.reset();
            return Err(SessionError::Overlay(e.to_string()));
        }
        self.engine = Some(MatchEngine::new(codes));
        Ok(HintOutcome::Active)
    }

    /// Feed one typed character.
    ///
    /// On a unique match the overlay is cleared first, then the target is
    /// activated; a failed activation is not retried.
    pub fn handle_key<C, O>(
        &mut self,
        ch: char,
        clicker: &C,
        overlay: &mut O,
    ) -> Result<HintOutcome, SessionError>
    where
        C: ClickDispatcher,
        O: OverlayRenderer,
    {
        let Some(engine) = self.engine.as_mut() else {
            return Ok(HintOutcome::Cancelled);
        };

        match engine.push(ch) {
            MatchStep::Ignored => Ok(HintOutcome::Active),
            MatchStep::NoMatch => {
                debug!("no code matches {:?}", ch);
                if let Err(e) = overlay
                    .feedback(Feedback::NoMatch)
                    .and_then(|()| overlay.highlight(&[]))
                {
                    self.abort(overlay);
                    return Err(SessionError::Overlay(e.to_string()));
                }
                Ok(HintOutcome::Active)
            }
            MatchStep::Ambiguous(indices) => {
                let codes: Vec<Code> = indices
                    .iter()
                    .map(|&i| self.labels[i].0.clone())
                    .collect();
                debug!("{} candidates left", codes.len());
                if let Err(e) = overlay.highlight(&codes) {
                    self.abort(overlay);
                    return Err(SessionError::Overlay(e.to_string()));
                }
                Ok(HintOutcome::Active)
            }
            MatchStep::Resolved(index) => {
                let (code, target) = self.labels.swap_remove(index);
                self.abort(overlay);
                info!("{} -> {:?} at {}", code, target.name, target.rect);
                clicker
                    .activate(&target)
                    .map_err(|e| SessionError::Click(e.to_string()))?;
                Ok(HintOutcome::Activated(target))
            }
        }
    }

    /// Tear the session down.  Calling this on an inactive session does
    /// nothing.
    pub fn deactivate<O: OverlayRenderer>(
        &mut self,
        overlay: &mut O,
    ) -> Result<HintOutcome, SessionError> {
        if !self.is_active() {
            return Ok(HintOutcome::Cancelled);
        }
        self.reset();
        overlay
            .clear()
            .map_err(|e| SessionError::Overlay(e.to_string()))?;
        Ok(HintOutcome::Cancelled)
    }

    fn abort<O: OverlayRenderer>(&mut self, overlay: &mut O) {
        self.reset();
        clear_quietly(overlay);
    }

    fn reset(&mut self) {
        self.labels.clear();
        self.engine = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::mock::{MockDesktop, MockOverlay, OverlayCall};

    fn started(n: usize) -> (HintSession, MockDesktop, MockOverlay) {
        let desktop = MockDesktop::with_targets(n);
        let mut overlay = MockOverlay::default();
        let mut session = HintSession::new();
        let outcome = session
            .activate(&Alphabet::default(), &desktop, &mut overlay)
            .unwrap();
        assert_eq!(outcome, HintOutcome::Active);
        (session, desktop, overlay)
    }

    #[test]
    fn activation_labels_every_target_in_order() {
        let (session, desktop, overlay) = started(3);
        assert_eq!(desktop.detect_calls.get(), 1);
        assert_eq!(
            overlay.calls,
            vec![OverlayCall::Labels(vec!["a".into(), "s".into(), "d".into()])]
        );
        assert_eq!(session.labels()[1].1.name, "button 1");
        assert!(session.is_active());
    }

    #[test]
    fn empty_detection_is_not_an_error() {
        let desktop = MockDesktop::with_targets(0);
        let mut overlay = MockOverlay::default();
        let mut session = HintSession::new();
        let outcome = session
            .activate(&Alphabet::default(), &desktop, &mut overlay)
            .unwrap();
        assert_eq!(outcome, HintOutcome::NoTargets);
        assert_eq!(overlay.calls, vec![OverlayCall::Feedback(Feedback::NoTargets)]);
        assert!(!session.is_active());
    }

    #[test]
    fn render_failure_aborts_activation() {
        let desktop = MockDesktop::with_targets(4);
        let mut overlay = MockOverlay::failing();
        let mut session = HintSession::new();
        let err = session.activate(&Alphabet::default(), &desktop, &mut overlay);
        assert!(matches!(err, Err(SessionError::Overlay(_))));
        assert!(!session.is_active());
        assert_eq!(overlay.last(), Some(&OverlayCall::Clear));
    }

    #[test]
    fn ambiguous_input_highlights_candidates() {
        let (mut session, desktop, mut overlay) = started(20);
        let outcome = session.handle_key('k', &desktop, &mut overlay).unwrap();
        assert_eq!(outcome, HintOutcome::Active);
        assert_eq!(
            overlay.last(),
            Some(&OverlayCall::Highlight(vec![
                "ka".into(),
                "ks".into(),
                "kd".into(),
                "kf".into()
            ]))
        );
        assert_eq!(session.prefix(), "k");
    }

    #[test]
    fn unique_match_clears_overlay_then_clicks() {
        let (mut session, desktop, mut overlay) = started(20);
        session.handle_key('s', &desktop, &mut overlay).unwrap();
        let outcome = session.handle_key('l', &desktop, &mut overlay).unwrap();
        // aj ak al sj sk sl → "sl" is the sixth code.
        assert_eq!(outcome, HintOutcome::Activated(crate::traits::mock::target(5)));
        assert_eq!(*desktop.clicks.borrow(), vec!["button 5".to_string()]);
        assert_eq!(overlay.last(), Some(&OverlayCall::Clear));
        assert!(!session.is_active());
    }

    #[test]
    fn no_match_gives_feedback_and_keeps_session() {
        let (mut session, desktop, mut overlay) = started(20);
        session.handle_key('a', &desktop, &mut overlay).unwrap();
        let outcome = session.handle_key('a', &desktop, &mut overlay).unwrap();
        assert_eq!(outcome, HintOutcome::Active);
        let n = overlay.calls.len();
        assert_eq!(
            overlay.calls[n - 2..],
            [
                OverlayCall::Feedback(Feedback::NoMatch),
                OverlayCall::Highlight(vec![])
            ]
        );
        assert_eq!(session.prefix(), "");
        assert!(session.is_active());
    }

    #[test]
    fn click_failure_ends_session_with_error() {
        let mut desktop = MockDesktop::with_targets(3);
        desktop.fail_click = true;
        let mut overlay = MockOverlay::default();
        let mut session = HintSession::new();
        session
            .activate(&Alphabet::default(), &desktop, &mut overlay)
            .unwrap();
        let err = session.handle_key('a', &desktop, &mut overlay);
        assert!(matches!(err, Err(SessionError::Click(_))));
        assert!(!session.is_active());
        assert_eq!(overlay.last(), Some(&OverlayCall::Clear));
    }

    #[test]
    fn deactivate_clears_once() {
        let (mut session, _desktop, mut overlay) = started(3);
        assert_eq!(session.deactivate(&mut overlay).unwrap(), HintOutcome::Cancelled);
        assert_eq!(overlay.last(), Some(&OverlayCall::Clear));
        let calls = overlay.calls.len();
        session.deactivate(&mut overlay).unwrap();
        assert_eq!(overlay.calls.len(), calls);
    }

    #[test]
    fn non_letters_are_ignored() {
        let (mut session, desktop, mut overlay) = started(20);
        let calls = overlay.calls.len();
        assert_eq!(
            session.handle_key('5', &desktop, &mut overlay).unwrap(),
            HintOutcome::Active
        );
        assert_eq!(overlay.calls.len(), calls);
    }
}
