//! Random OSN built on correlated OT.
//!
//! Both parties consume one batch of COTs per level of the switching network.
//! The sender then sends a single message holding the corrections of every switch.

mod receiver;
mod sender;

pub use receiver::Receiver;
pub use sender::Sender;

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use mpz_common::{executor::test_st_executor, Context};
    use mpz_core::Block;
    use mpz_osn_core::ROSNConfig;
    use mpz_ot::{
        ideal::cot::{ideal_cot, IdealCOTReceiver, IdealCOTSender},
        COTSender, COTSenderOutput, Correlation, DeltaSetup, OTError,
    };
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use rstest::rstest;

    use super::*;
    use crate::{RandomOSNReceiver, RandomOSNSender, ROSNReceiverOutput, ROSNSenderOutput};

    fn random_permutation(n: usize, rng: &mut StdRng) -> Vec<usize> {
        let mut perm: Vec<usize> = (0..n).collect();
        for i in (1..n).rev() {
            perm.swap(i, rng.gen_range(0..=i));
        }
        perm
    }

    fn assert_permuted(perm: &[usize], sender: &ROSNSenderOutput, receiver: &ROSNReceiverOutput) {
        let permuted = receiver.unmask(sender.share());
        for (i, &p) in perm.iter().enumerate() {
            assert_eq!(permuted.get(i), sender.input_mask().get(p), "mismatch at {i}");
        }
    }

    fn parties(config: ROSNConfig) -> (Sender<IdealCOTSender>, Receiver<IdealCOTReceiver>) {
        let (cot_sender, cot_receiver) = ideal_cot();
        (
            Sender::new(config.clone(), cot_sender),
            Receiver::new(config, cot_receiver),
        )
    }

    /// A COT sender whose transfers always fail.
    #[derive(Debug, Default)]
    struct FailingCOTSender {
        delta: Block,
    }

    #[async_trait]
    impl<Ctx: Context> DeltaSetup<Ctx, Block> for FailingCOTSender {
        async fn setup_with_delta(&mut self, _ctx: &mut Ctx, delta: Block) -> Result<(), OTError> {
            self.delta = delta;
            Ok(())
        }
    }

    impl Correlation for FailingCOTSender {
        type Correlation = Block;

        fn delta(&self) -> Block {
            self.delta
        }
    }

    #[async_trait]
    impl<Ctx: Context> COTSender<Ctx, Block> for FailingCOTSender {
        async fn send_correlated(
            &mut self,
            _ctx: &mut Ctx,
            _count: usize,
        ) -> Result<COTSenderOutput<Block>, OTError> {
            Err(OTError::SenderError("connection reset".into()))
        }
    }

    #[rstest]
    #[case::one(1, 16)]
    #[case::two(2, 16)]
    #[case::three(3, 1)]
    #[case::five(5, 16)]
    #[case::nine(9, 17)]
    #[case::odd(101, 8)]
    #[case::many(1024, 32)]
    #[tokio::test]
    async fn test_rosn(#[case] num: usize, #[case] byte_len: usize) {
        let (mut ctx_sender, mut ctx_receiver) = test_st_executor(8);
        let (mut sender, mut receiver) = parties(ROSNConfig::default());
        let perm = random_permutation(num, &mut StdRng::seed_from_u64(num as u64));

        tokio::try_join!(
            sender.setup(&mut ctx_sender),
            receiver.setup(&mut ctx_receiver)
        )
        .unwrap();

        let (sender_output, receiver_output) = tokio::try_join!(
            sender.rosn(&mut ctx_sender, num, byte_len),
            receiver.rosn(&mut ctx_receiver, &perm, byte_len)
        )
        .unwrap();

        assert_eq!(sender_output.share().len(), num);
        assert_eq!(receiver_output.share().len(), num);
        assert_permuted(&perm, &sender_output, &receiver_output);
    }

    #[tokio::test]
    async fn test_rosn_end_to_end() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();

        let (mut ctx_sender, mut ctx_receiver) = test_st_executor(8);
        let (mut sender, mut receiver) = parties(ROSNConfig::default());
        let perm = [2, 0, 4, 1, 3];

        tokio::try_join!(
            sender.setup(&mut ctx_sender),
            receiver.setup(&mut ctx_receiver)
        )
        .unwrap();

        let (sender_output, receiver_output) = tokio::try_join!(
            sender.rosn(&mut ctx_sender, 5, 16),
            receiver.rosn(&mut ctx_receiver, &perm, 16)
        )
        .unwrap();

        let s = sender_output.input_mask();
        let expected: Vec<u8> = perm
            .iter()
            .flat_map(|&i| s.get(i).unwrap().to_vec())
            .collect();

        assert_eq!(
            receiver_output.unmask(sender_output.share()).as_bytes(),
            &expected[..]
        );
    }

    #[tokio::test]
    async fn test_rosn_session_is_reusable() {
        let (mut ctx_sender, mut ctx_receiver) = test_st_executor(8);
        let config = ROSNConfig::builder()
            .max_parallelism(1)
            .build()
            .unwrap();
        let (mut sender, mut receiver) = parties(config);
        let mut rng = StdRng::seed_from_u64(0);

        tokio::try_join!(
            sender.setup(&mut ctx_sender),
            receiver.setup(&mut ctx_receiver)
        )
        .unwrap();

        let mut previous: Option<ROSNSenderOutput> = None;
        for num in [7, 7, 32] {
            let perm = random_permutation(num, &mut rng);
            let (sender_output, receiver_output) = tokio::try_join!(
                sender.rosn(&mut ctx_sender, num, 4),
                receiver.rosn(&mut ctx_receiver, &perm, 4)
            )
            .unwrap();

            assert_permuted(&perm, &sender_output, &receiver_output);
            if let Some(previous) = previous.replace(sender_output.clone()) {
                assert_ne!(previous.share(), sender_output.share());
            }
        }
    }

    #[tokio::test]
    async fn test_rosn_requires_setup() {
        let (mut ctx_sender, mut ctx_receiver) = test_st_executor(8);
        let (mut sender, mut receiver) = parties(ROSNConfig::default());

        let err = sender.rosn(&mut ctx_sender, 4, 16).await.unwrap_err();
        assert!(!err.is_abort());

        let err = receiver
            .rosn(&mut ctx_receiver, &[0, 1, 2, 3], 16)
            .await
            .unwrap_err();
        assert!(!err.is_abort());

        // The instances are still usable.
        tokio::try_join!(
            sender.setup(&mut ctx_sender),
            receiver.setup(&mut ctx_receiver)
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_rosn_invalid_input_keeps_session() {
        let (mut ctx_sender, mut ctx_receiver) = test_st_executor(8);
        let (mut sender, mut receiver) = parties(ROSNConfig::default());

        tokio::try_join!(
            sender.setup(&mut ctx_sender),
            receiver.setup(&mut ctx_receiver)
        )
        .unwrap();

        assert!(!sender.rosn(&mut ctx_sender, 0, 16).await.unwrap_err().is_abort());
        assert!(!sender.rosn(&mut ctx_sender, 4, 0).await.unwrap_err().is_abort());
        assert!(!receiver
            .rosn(&mut ctx_receiver, &[0, 0, 1], 16)
            .await
            .unwrap_err()
            .is_abort());
        assert!(!receiver
            .rosn(&mut ctx_receiver, &[], 16)
            .await
            .unwrap_err()
            .is_abort());

        let perm = [1, 2, 0];
        let (sender_output, receiver_output) = tokio::try_join!(
            sender.rosn(&mut ctx_sender, 3, 16),
            receiver.rosn(&mut ctx_receiver, &perm, 16)
        )
        .unwrap();

        assert_permuted(&perm, &sender_output, &receiver_output);
    }

    #[tokio::test]
    async fn test_rosn_malformed_corrections_abort() {
        let (mut ctx_sender, mut ctx_receiver) = test_st_executor(8);
        let (mut sender, mut receiver) = parties(ROSNConfig::default());
        let perm = [3, 0, 1, 2];

        tokio::try_join!(
            sender.setup(&mut ctx_sender),
            receiver.setup(&mut ctx_receiver)
        )
        .unwrap();

        // The parties disagree on the value length, so the corrections the
        // receiver gets have the wrong entry length.
        let (sent, received) = tokio::join!(
            sender.rosn(&mut ctx_sender, 4, 8),
            receiver.rosn(&mut ctx_receiver, &perm, 16)
        );

        assert!(sent.is_ok());
        let err = received.unwrap_err();
        assert!(err.is_abort());

        // An aborted session can not be used again.
        let err = receiver
            .rosn(&mut ctx_receiver, &perm, 16)
            .await
            .unwrap_err();
        assert!(!err.is_abort());
        assert!(err.to_string().starts_with("State Error"));
    }

    #[tokio::test]
    async fn test_rosn_sender_cot_failure_aborts() {
        let (mut ctx_sender, _ctx_receiver) = test_st_executor(8);
        let mut sender = Sender::new(ROSNConfig::default(), FailingCOTSender::default());

        sender.setup(&mut ctx_sender).await.unwrap();

        let err = sender.rosn(&mut ctx_sender, 4, 16).await.unwrap_err();
        assert!(err.is_abort());
        assert!(err.to_string().starts_with("OT Error"));

        // An aborted session can not be used again.
        let err = sender.rosn(&mut ctx_sender, 4, 16).await.unwrap_err();
        assert!(!err.is_abort());
        assert!(err.to_string().starts_with("State Error"));
    }
}
