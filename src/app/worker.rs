use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use affect_atlas::classify::{
    Classifier, ClassifierReply, ClassifyError, TextExtractor, is_too_short,
};
use affect_atlas::entry::EntryId;
use tracing::{info, warn};

pub(super) enum Job {
    Text { id: EntryId, text: String },
    Image { id: EntryId, path: PathBuf },
}

pub(super) struct Classified {
    pub(super) reply: ClassifierReply,
    pub(super) ocr_text: Option<String>,
}

pub(super) struct JobResult {
    pub(super) id: EntryId,
    pub(super) outcome: Result<Classified, String>,
}

/// Runs OCR and classification off the UI thread, one job at a time.
pub(super) struct ClassificationWorker {
    jobs: Sender<Job>,
    results: Receiver<JobResult>,
    in_flight: usize,
}

impl ClassificationWorker {
    pub(super) fn spawn(
        classifier: Box<dyn Classifier>,
        extractor: Box<dyn TextExtractor>,
    ) -> Self {
        let (jobs, job_rx) = mpsc::channel::<Job>();
        let (result_tx, results) = mpsc::channel();

        thread::spawn(move || {
            for job in job_rx {
                let result = run_job(classifier.as_ref(), extractor.as_ref(), job);
                if result_tx.send(result).is_err() {
                    break;
                }
            }
        });

        Self {
            jobs,
            results,
            in_flight: 0,
        }
    }

    pub(super) fn submit(&mut self, job: Job) -> bool {
        match self.jobs.send(job) {
            Ok(()) => {
                self.in_flight += 1;
                true
            }
            Err(_) => {
                warn!("classification worker is gone; job dropped");
                false
            }
        }
    }

    pub(super) fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Finished jobs, without blocking.
    pub(super) fn drain(&mut self) -> Vec<JobResult> {
        let mut finished = Vec::new();
        loop {
            match self.results.try_recv() {
                Ok(result) => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    finished.push(result);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.in_flight = 0;
                    break;
                }
            }
        }
        finished
    }
}

fn run_job(classifier: &dyn Classifier, extractor: &dyn TextExtractor, job: Job) -> JobResult {
    let (id, outcome) = match job {
        Job::Text { id, text } => {
            let outcome = classifier.classify(&text).map(|reply| Classified {
                reply,
                ocr_text: None,
            });
            (id, outcome)
        }
        Job::Image { id, path } => {
            let outcome = extractor.extract(&path).and_then(|text| {
                if is_too_short(&text) {
                    return Err(ClassifyError::TooShort);
                }
                classifier.classify(&text).map(|reply| Classified {
                    reply,
                    ocr_text: Some(text),
                })
            });
            (id, outcome)
        }
    };

    if let Ok(classified) = &outcome {
        info!(
            entry = %id,
            emotion = %classified.reply.classification.emotion(),
            "entry classified"
        );
    }

    JobResult {
        id,
        outcome: outcome.map_err(|error| error.to_string()),
    }
}
