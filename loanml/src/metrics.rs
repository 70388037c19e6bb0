// BSD 3-Clause License
//
// Copyright (c) 2025, BlackPortal ○
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice, this
//    list of conditions and the following disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice,
//    this list of conditions and the following disclaimer in the documentation
//    and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its
//    contributors may be used to endorse or promote products derived from
//    this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
// FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
// DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
// CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
// OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

use std::fmt;

use ndarray::Array1;

use crate::errors::MetricsError;
use crate::losses::{CrossEntropy, LossFunction};

fn check_pair(predicted: &Array1<f64>, actual: &Array1<f64>) -> Result<(), MetricsError> {
    if predicted.is_empty() || actual.is_empty() {
        return Err(MetricsError::EmptyInput);
    }
    if predicted.len() != actual.len() {
        return Err(MetricsError::DimensionMismatch {
            expected: predicted.len(),
            actual: actual.len(),
        });
    }
    Ok(())
}

fn check_binary(labels: &Array1<f64>) -> Result<(), MetricsError> {
    if labels.iter().any(|&v| v != 0.0 && v != 1.0) {
        return Err(MetricsError::InvalidLabel);
    }
    Ok(())
}

/// Turns probabilities into 0/1 labels: 1 where `p >= threshold`.
pub fn classify(probabilities: &Array1<f64>, threshold: f64) -> Result<Array1<f64>, MetricsError> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(MetricsError::InvalidThreshold(threshold));
    }
    Ok(probabilities.mapv(|p| if p >= threshold { 1.0 } else { 0.0 }))
}

/// Counts of a binary classifier's outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub true_negative: usize,
    pub false_negative: usize,
    pub false_positive: usize,
    pub true_positive: usize,
}

impl ConfusionMatrix {
    pub fn from_predictions(
        predicted: &Array1<f64>,
        actual: &Array1<f64>,
    ) -> Result<Self, MetricsError> {
        check_pair(predicted, actual)?;
        check_binary(predicted)?;
        check_binary(actual)?;

        let mut matrix = ConfusionMatrix::default();
        for (&p, &a) in predicted.iter().zip(actual.iter()) {
            match (p == 1.0, a == 1.0) {
                (false, false) => matrix.true_negative += 1,
                (false, true) => matrix.false_negative += 1,
                (true, false) => matrix.false_positive += 1,
                (true, true) => matrix.true_positive += 1,
            }
        }
        Ok(matrix)
    }

    pub fn total(&self) -> usize {
        self.true_negative + self.false_negative + self.false_positive + self.true_positive
    }

    /// `(TP + TN) / total`.
    pub fn accuracy(&self) -> f64 {
        (self.true_positive + self.true_negative) as f64 / self.total() as f64
    }

    /// Rows are predicted 0/1, columns actual 0/1.
    pub fn to_array(&self) -> [[usize; 2]; 2] {
        [
            [self.true_negative, self.false_negative],
            [self.false_positive, self.true_positive],
        ]
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>12} {:>10} {:>10}", "", "actual 0", "actual 1")?;
        writeln!(f, "{:>12} {:>10} {:>10}", "predicted 0", self.true_negative, self.false_negative)?;
        write!(f, "{:>12} {:>10} {:>10}", "predicted 1", self.false_positive, self.true_positive)
    }
}

/// Share of predictions equal to the actual label.
pub fn accuracy(predicted: &Array1<f64>, actual: &Array1<f64>) -> Result<f64, MetricsError> {
    check_pair(predicted, actual)?;
    let correct = predicted.iter().zip(actual.iter()).filter(|(p, a)| p == a).count();
    Ok(correct as f64 / actual.len() as f64)
}

/// Accuracy of always predicting the majority class of `labels`.
pub fn baseline_accuracy(labels: &Array1<f64>) -> Result<f64, MetricsError> {
    if labels.is_empty() {
        return Err(MetricsError::EmptyInput);
    }
    check_binary(labels)?;
    let positives = labels.iter().filter(|&&v| v == 1.0).count();
    let majority = positives.max(labels.len() - positives);
    Ok(majority as f64 / labels.len() as f64)
}

/// Area under the ROC curve from the Mann–Whitney rank statistic.
///
/// Tied scores share their average rank, so a tie between a positive and a
/// negative counts one half. The result does not depend on any threshold.
pub fn roc_auc(scores: &Array1<f64>, labels: &Array1<f64>) -> Result<f64, MetricsError> {
    check_pair(scores, labels)?;
    check_binary(labels)?;

    let n_pos = labels.iter().filter(|&&v| v == 1.0).count();
    let n_neg = labels.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(MetricsError::SingleClass);
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut positive_rank_sum = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start;
        while end + 1 < order.len() && scores[order[end + 1]] == scores[order[start]] {
            end += 1;
        }
        // Ranks are 1-based; the tie group spans ranks start+1 ..= end+1.
        let average_rank = (start + end + 2) as f64 / 2.0;
        let positives_in_group =
            order[start..=end].iter().filter(|&&i| labels[i] == 1.0).count();
        positive_rank_sum += average_rank * positives_in_group as f64;
        start = end + 1;
    }

    let n_pos = n_pos as f64;
    let n_neg = n_neg as f64;
    Ok((positive_rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg))
}

/// Test-set evaluation of a fitted classifier.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub threshold: f64,
    pub probabilities: Array1<f64>,
    pub predictions: Array1<f64>,
    pub confusion_matrix: ConfusionMatrix,
    pub accuracy: f64,
    /// Majority-class share of the training labels.
    pub baseline_accuracy: f64,
    /// AUC of the thresholded 0/1 predictions.
    pub auc: f64,
    /// AUC of the raw probabilities.
    pub probability_auc: f64,
    pub log_loss: f64,
}

/// Scores test probabilities against test labels.
///
/// `auc` ranks the thresholded predictions, so it only reflects the single
/// operating point at `threshold`; `probability_auc` ranks the probabilities.
pub fn evaluate(
    probabilities: &Array1<f64>,
    actual: &Array1<f64>,
    train_labels: &Array1<f64>,
    threshold: f64,
) -> Result<Evaluation, MetricsError> {
    let predictions = classify(probabilities, threshold)?;
    let confusion_matrix = ConfusionMatrix::from_predictions(&predictions, actual)?;
    let log_loss = CrossEntropy.calculate(probabilities, actual)?;

    Ok(Evaluation {
        threshold,
        probabilities: probabilities.clone(),
        accuracy: confusion_matrix.accuracy(),
        baseline_accuracy: baseline_accuracy(train_labels)?,
        auc: roc_auc(&predictions, actual)?,
        probability_auc: roc_auc(probabilities, actual)?,
        predictions,
        confusion_matrix,
        log_loss,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    /// Test predictions reproducing the confusion matrix [[2411, 455], [5, 3]].
    fn reference_scenario() -> (Array1<f64>, Array1<f64>, Array1<f64>) {
        let mut probabilities = Vec::new();
        let mut actual = Vec::new();
        for (count, p, a) in [(2411, 0.2, 0.0), (455, 0.2, 1.0), (5, 0.6, 0.0), (3, 0.6, 1.0)] {
            probabilities.extend(std::iter::repeat(p).take(count));
            actual.extend(std::iter::repeat(a).take(count));
        }
        let mut train = vec![0.0; 5629];
        train.extend(std::iter::repeat(1.0).take(1075));
        (Array1::from_vec(probabilities), Array1::from_vec(actual), Array1::from_vec(train))
    }

    #[test]
    fn test_reference_scenario() {
        let (probabilities, actual, train) = reference_scenario();
        let evaluation = evaluate(&probabilities, &actual, &train, 0.5).unwrap();

        assert_eq!(evaluation.confusion_matrix.to_array(), [[2411, 455], [5, 3]]);
        assert_eq!(evaluation.confusion_matrix.total(), 2874);
        assert!((evaluation.accuracy - 0.8399).abs() < 1e-4);
        assert!((evaluation.baseline_accuracy - 0.8396).abs() < 1e-4);
        assert!((evaluation.auc - 0.5022).abs() < 1e-4);
    }

    #[test]
    fn test_confusion_matrix_counts_sum_to_total() {
        let predicted = array![1.0, 0.0, 1.0, 1.0, 0.0, 0.0];
        let actual = array![1.0, 0.0, 0.0, 1.0, 1.0, 0.0];
        let matrix = ConfusionMatrix::from_predictions(&predicted, &actual).unwrap();

        assert_eq!(matrix.true_positive, 2);
        assert_eq!(matrix.true_negative, 2);
        assert_eq!(matrix.false_positive, 1);
        assert_eq!(matrix.false_negative, 1);
        assert_eq!(matrix.total(), predicted.len());
        let expected = (matrix.true_positive + matrix.true_negative) as f64 / 6.0;
        assert!((matrix.accuracy() - expected).abs() < 1e-9);
        assert!((accuracy(&predicted, &actual).unwrap() - matrix.accuracy()).abs() < 1e-9);
    }

    #[test]
    fn test_classify_threshold_is_inclusive() {
        let predicted = classify(&array![0.49, 0.5, 0.51], 0.5).unwrap();
        assert_eq!(predicted, array![0.0, 1.0, 1.0]);
        assert_eq!(classify(&array![0.5], 1.5), Err(MetricsError::InvalidThreshold(1.5)));
    }

    #[test]
    fn test_baseline_accuracy_is_majority_share() {
        let labels = array![0.0, 0.0, 1.0, 0.0];
        assert!((baseline_accuracy(&labels).unwrap() - 0.75).abs() < 1e-12);
        let labels = array![1.0, 1.0, 1.0, 0.0, 0.0];
        assert!((baseline_accuracy(&labels).unwrap() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_roc_auc_perfect_and_inverted() {
        let labels = array![0.0, 0.0, 1.0, 1.0];
        assert_eq!(roc_auc(&array![0.1, 0.2, 0.8, 0.9], &labels).unwrap(), 1.0);
        assert_eq!(roc_auc(&array![0.9, 0.8, 0.2, 0.1], &labels).unwrap(), 0.0);
    }

    #[test]
    fn test_roc_auc_constant_predictor_is_half() {
        let labels = array![0.0, 1.0, 0.0, 1.0, 0.0];
        assert_eq!(roc_auc(&array![0.3, 0.3, 0.3, 0.3, 0.3], &labels).unwrap(), 0.5);
    }

    #[test]
    fn test_roc_auc_counts_pairs() {
        // Pairs (pos, neg): 0.35 beats 0.1, loses to 0.4; 0.8 beats both.
        let scores = array![0.1, 0.4, 0.35, 0.8];
        let labels = array![0.0, 0.0, 1.0, 1.0];
        assert!((roc_auc(&scores, &labels).unwrap() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_roc_auc_single_class() {
        let result = roc_auc(&array![0.1, 0.9], &array![1.0, 1.0]);
        assert_eq!(result, Err(MetricsError::SingleClass));
    }

    #[test]
    fn test_metrics_dimension_mismatch() {
        let result = ConfusionMatrix::from_predictions(&array![1.0, 0.0], &array![1.0]);
        assert_eq!(result, Err(MetricsError::DimensionMismatch { expected: 2, actual: 1 }));
    }

    #[test]
    fn test_metrics_invalid_label() {
        assert_eq!(baseline_accuracy(&array![0.0, 2.0]), Err(MetricsError::InvalidLabel));
    }
}
