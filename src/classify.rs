/*!
 * The seam between a scan and the leaf color classifier.
 *
 * The classifier itself is an external model, all this crate needs from it is a [LeafReading] per
 * image.
 */
use crate::sample::LeafReading;

/// Anything that can read the leaf color chart level from an image of a leaf.
pub trait LeafClassifier {
    type Image;

    fn classify(&self, image: &Self::Image) -> LeafReading;
}

/// A model that scores an image against the four leaf color chart classes.
pub trait ProbabilityModel {
    type Image;

    /// Class probabilities in the order of [LeafReading::CLASSES].
    fn probabilities(&self, image: &Self::Image) -> Vec<f64>;
}

/// A classifier that reports [LeafReading::Uncertain] when the model is not confident enough.
#[derive(Debug, Clone)]
pub struct ThresholdClassifier<M> {
    model: M,
    confidence_threshold: f64,
}

impl<M: ProbabilityModel> ThresholdClassifier<M> {
    pub fn new(model: M, confidence_threshold: f64) -> Self {
        ThresholdClassifier {
            model,
            confidence_threshold,
        }
    }
}

impl<M: ProbabilityModel> LeafClassifier for ThresholdClassifier<M> {
    type Image = M::Image;

    fn classify(&self, image: &Self::Image) -> LeafReading {
        LeafReading::from_probabilities(
            &self.model.probabilities(image),
            self.confidence_threshold,
        )
    }
}

impl LeafReading {
    /**
     * Pick the most likely class from the output of a classifier.
     *
     * #Arguments
     * probabilities - one value per class in the order of [LeafReading::CLASSES].
     * confidence_threshold - the best probability has to reach this value.
     *
     * #Returns
     * The most likely class, or [LeafReading::Uncertain] if it is below the confidence threshold
     * or the probabilities are malformed (wrong length or not finite).
     */
    pub fn from_probabilities(probabilities: &[f64], confidence_threshold: f64) -> LeafReading {
        if probabilities.len() != LeafReading::CLASSES.len()
            || probabilities.iter().any(|p| !p.is_finite())
        {
            log::warn!("malformed classifier output: {:?}", probabilities);
            return LeafReading::Uncertain;
        }

        let best = LeafReading::CLASSES
            .iter()
            .zip(probabilities)
            .max_by(|(_, a), (_, b)| a.total_cmp(b));

        match best {
            Some((&reading, &p)) if p >= confidence_threshold => reading,
            _ => LeafReading::Uncertain,
        }
    }
}

/// Classify every image of a scan, keeping the input order.
pub fn classify_all<C: LeafClassifier>(classifier: &C, images: &[C::Image]) -> Vec<LeafReading> {
    let readings: Vec<LeafReading> = images.iter().map(|img| classifier.classify(img)).collect();

    log::debug!(
        "classified {} images, {} uncertain",
        readings.len(),
        readings
            .iter()
            .filter(|&&r| r == LeafReading::Uncertain)
            .count()
    );

    readings
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<f64>);

    impl ProbabilityModel for Fixed {
        type Image = ();

        fn probabilities(&self, _image: &()) -> Vec<f64> {
            self.0.clone()
        }
    }

    #[test]
    fn test_confident_reading() {
        let reading = LeafReading::from_probabilities(&[0.05, 0.1, 0.8, 0.05], 0.7);
        assert_eq!(reading, LeafReading::Swap3);
    }

    #[test]
    fn test_low_confidence_is_uncertain() {
        let reading = LeafReading::from_probabilities(&[0.3, 0.3, 0.2, 0.2], 0.7);
        assert_eq!(reading, LeafReading::Uncertain);
    }

    #[test]
    fn test_malformed_output_is_uncertain() {
        assert_eq!(
            LeafReading::from_probabilities(&[1.0, 0.0], 0.7),
            LeafReading::Uncertain
        );
        assert_eq!(
            LeafReading::from_probabilities(&[f64::NAN, 0.0, 0.0, 1.0], 0.7),
            LeafReading::Uncertain
        );
    }

    #[test]
    fn test_classify_all() {
        let classifier = ThresholdClassifier::new(Fixed(vec![0.0, 0.0, 0.0, 1.0]), 0.7);
        let readings = classify_all(&classifier, &[(), ()]);
        assert_eq!(readings, vec![LeafReading::Swap4, LeafReading::Swap4]);
    }
}
