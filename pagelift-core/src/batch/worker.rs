//! Worker threads for page-parallel processing

use super::progress::{PageProgress, ProgressCallback};
use crate::page::PageInput;
use crate::pipeline::{PageOutput, PagePipeline};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{mpsc, Mutex};
use std::thread;
use tracing::{trace, warn};

/// Process `pages` on `workers` threads; outputs come back in input order.
pub(crate) fn run_pages(
    pipeline: &PagePipeline,
    pages: Vec<PageInput>,
    workers: usize,
    progress: &PageProgress,
    callback: Option<&dyn ProgressCallback>,
) -> Vec<PageOutput> {
    let total = pages.len();
    let page_numbers: Vec<u32> = pages.iter().map(|p| p.page_number).collect();
    let (job_sender, job_receiver) = mpsc::channel::<(usize, PageInput)>();
    let (result_sender, result_receiver) = mpsc::channel::<(usize, PageOutput)>();

    for job in pages.into_iter().enumerate() {
        // The receiver outlives this loop, so sending cannot fail
        let _ = job_sender.send(job);
    }
    drop(job_sender);

    let job_receiver = Mutex::new(job_receiver);
    thread::scope(|scope| {
        for id in 0..workers.clamp(1, total.max(1)) {
            let jobs = &job_receiver;
            let results = result_sender.clone();
            scope.spawn(move || worker_loop(id, pipeline, jobs, results, progress, callback));
        }
    });
    drop(result_sender);

    let mut slots: Vec<Option<PageOutput>> = (0..total).map(|_| None).collect();
    for (idx, output) in result_receiver {
        slots[idx] = Some(output);
    }
    slots
        .into_iter()
        .zip(page_numbers)
        .map(|(slot, page_number)| {
            slot.unwrap_or_else(|| PageOutput::failed(page_number, format!("page {page_number}: never processed")))
        })
        .collect()
}

fn worker_loop(
    id: usize,
    pipeline: &PagePipeline,
    jobs: &Mutex<mpsc::Receiver<(usize, PageInput)>>,
    results: mpsc::Sender<(usize, PageOutput)>,
    progress: &PageProgress,
    callback: Option<&dyn ProgressCallback>,
) {
    loop {
        let job = {
            let receiver = match jobs.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            receiver.recv()
        };
        let Ok((idx, page)) = job else {
            break;
        };

        trace!(worker = id, page = page.page_number, "processing page");
        let output = match process_isolated(pipeline, &page) {
            Ok(output) => {
                progress.complete_page();
                output
            }
            Err(message) => {
                progress.fail_page();
                PageOutput::failed(
                    page.page_number,
                    format!("page {}: panicked: {message}", page.page_number),
                )
            }
        };
        if let Some(callback) = callback {
            callback.on_progress(&progress.info());
        }
        if results.send((idx, output)).is_err() {
            break;
        }
    }
}

/// Run one page, returning the panic message if processing panicked.
pub(crate) fn process_isolated(
    pipeline: &PagePipeline,
    page: &PageInput,
) -> std::result::Result<PageOutput, String> {
    catch_unwind(AssertUnwindSafe(|| pipeline.process(page))).map_err(|payload| {
        let message = panic_message(payload.as_ref());
        warn!(page = page.page_number, %message, "page processing panicked");
        message
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
